//! Rename resolution for target archive entries.
//!
//! Each target file is looked up in the [`SourceIndex`] by its identifier.
//! A match renames the file to the source path; anything else keeps the
//! target's own path. Content is passed through byte for byte.
//!
//! Resolution happens in two steps. [`plan`] decides every output path
//! without touching entry data, which makes it suitable for dry runs.
//! [`resolve`] and [`resolve_async`] then materialize the content of each
//! planned entry. The async variant reads several entries concurrently but
//! always emits them in the target archive's native order.

use futures::stream::{self, StreamExt};

use crate::index::SourceIndex;
use crate::read::{ArchiveRecord, ContentHandle};
use crate::{Error, Result};

/// How the output path of a target file was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The identifier matched a source file; the entry takes its path.
    Renamed,
    /// The file has an identifier that no source file shares.
    Unmatched,
    /// The file name does not start with a digit.
    NoIdentifier,
}

impl Resolution {
    /// Returns `true` if the output path differs in origin from the target path.
    pub fn is_renamed(self) -> bool {
        matches!(self, Self::Renamed)
    }
}

/// A target file with its decided output path and not yet read content.
#[derive(Debug, Clone)]
pub struct PlannedRename {
    /// Path of the file in the target archive.
    pub original_path: String,
    /// Path the file will have in the output archive.
    pub output_path: String,
    /// How the output path was decided.
    pub resolution: Resolution,
    /// Handle to the target file content.
    pub content: ContentHandle,
}

/// A target file ready to be written to the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// Path of the file in the target archive.
    pub original_path: String,
    /// Path of the file in the output archive.
    pub output_path: String,
    /// How the output path was decided.
    pub resolution: Resolution,
    /// Content, identical to the target file content.
    pub content: Vec<u8>,
}

/// Options for [`resolve_async`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Maximum number of content reads in flight. `0` uses the available
    /// parallelism of the machine.
    pub concurrency: usize,
}

impl ResolveOptions {
    /// Creates options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of concurrent content reads.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    fn effective_concurrency(&self) -> usize {
        match self.concurrency {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            n => n,
        }
    }
}

/// Decides the output path of every target file.
///
/// Directory records are skipped. The result follows the order of `records`.
pub fn plan(records: &[ArchiveRecord], index: &SourceIndex) -> Vec<PlannedRename> {
    records
        .iter()
        .filter(|r| !r.is_directory)
        .map(|record| {
            let (output_path, resolution) = match record.identifier() {
                Some(id) => match index.get(id.as_str()) {
                    Some(source_path) => (source_path.to_string(), Resolution::Renamed),
                    None => (record.path.clone(), Resolution::Unmatched),
                },
                None => (record.path.clone(), Resolution::NoIdentifier),
            };
            log::trace!(
                "'{}' -> '{}' ({:?})",
                record.path,
                output_path,
                resolution
            );
            PlannedRename {
                original_path: record.path.clone(),
                output_path,
                resolution,
                content: record.content.clone(),
            }
        })
        .collect()
}

/// Resolves target records against the source index, reading content
/// sequentially.
///
/// # Errors
///
/// Returns [`Error::ContentRead`] for the first entry whose content cannot
/// be read. No entries are returned in that case.
pub fn resolve(records: &[ArchiveRecord], index: &SourceIndex) -> Result<Vec<ResolvedEntry>> {
    plan(records, index)
        .into_iter()
        .map(|planned| {
            let content = planned.content.read()?;
            Ok(ResolvedEntry {
                original_path: planned.original_path,
                output_path: planned.output_path,
                resolution: planned.resolution,
                content,
            })
        })
        .collect()
}

/// Resolves target records against the source index, reading content
/// concurrently on the blocking thread pool.
///
/// Completed reads are stored by position, so the returned entries follow
/// the order of `records` regardless of completion order.
///
/// # Errors
///
/// Returns [`Error::ContentRead`] if any content read fails. No entries are
/// returned in that case.
pub async fn resolve_async(
    records: &[ArchiveRecord],
    index: &SourceIndex,
    options: &ResolveOptions,
) -> Result<Vec<ResolvedEntry>> {
    let planned = plan(records, index);

    let reads = planned.iter().enumerate().map(|(pos, entry)| {
        let handle = entry.content.clone();
        let path = entry.original_path.clone();
        async move {
            let data = read_blocking(&path, move || handle.read()).await?;
            Ok::<_, Error>((pos, data))
        }
    });
    let slots = gather_ordered(reads, planned.len(), options.effective_concurrency()).await?;

    planned
        .into_iter()
        .zip(slots)
        .map(|(entry, data)| {
            let content = data
                .ok_or_else(|| Error::content_read(&entry.original_path, "read did not complete"))?;
            Ok(ResolvedEntry {
                original_path: entry.original_path,
                output_path: entry.output_path,
                resolution: entry.resolution,
                content,
            })
        })
        .collect()
}

/// Runs a content read on the blocking pool. A read task that panics or is
/// cancelled is reported as a failed read of `path`.
async fn read_blocking<F>(path: &str, read: F) -> Result<Vec<u8>>
where
    F: FnOnce() -> Result<Vec<u8>> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|e| Error::content_read(path, e))?
}

/// Drives positioned tasks with bounded concurrency and stores each result
/// in the slot of its position, whatever the completion order.
///
/// Stops at the first failed task.
async fn gather_ordered<T, F>(
    tasks: impl Iterator<Item = F>,
    len: usize,
    concurrency: usize,
) -> Result<Vec<Option<T>>>
where
    F: Future<Output = Result<(usize, T)>>,
{
    let mut slots: Vec<Option<T>> = (0..len).map(|_| None).collect();
    let mut completed = stream::iter(tasks).buffer_unordered(concurrency.max(1));

    while let Some(result) = completed.next().await {
        let (pos, value) = result?;
        slots[pos] = Some(value);
    }
    Ok(slots)
}

/// Counters describing the outcome of a rename run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameReport {
    /// Target files renamed to a source path.
    pub renamed: usize,
    /// Target files whose identifier has no source match.
    pub unmatched_identifier: usize,
    /// Target files without an identifier.
    pub no_identifier: usize,
    /// Entries dropped from the output because a later entry had the same path.
    pub overwritten: usize,
}

impl RenameReport {
    /// Counts the resolutions of the given entries.
    pub fn from_entries(entries: &[ResolvedEntry]) -> Self {
        let mut report = Self::default();
        for entry in entries {
            match entry.resolution {
                Resolution::Renamed => report.renamed += 1,
                Resolution::Unmatched => report.unmatched_identifier += 1,
                Resolution::NoIdentifier => report.no_identifier += 1,
            }
        }
        report
    }

    /// Target files kept under their original path.
    pub fn unchanged(&self) -> usize {
        self.unmatched_identifier + self.no_identifier
    }

    /// Total number of target files processed.
    pub fn total(&self) -> usize {
        self.renamed + self.unchanged()
    }

    /// Number of entries in the output archive.
    pub fn written(&self) -> usize {
        self.total() - self.overwritten
    }
}
