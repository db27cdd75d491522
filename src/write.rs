//! Assembly of the output archive.
//!
//! [`write_archive`] encodes resolved entries into a new zip archive in the
//! order given. Only file entries are written; folders are implied by the
//! `/` separators in entry paths.
//!
//! When several entries share an output path, the archive contains the
//! content of the last one, stored at the position where the path first
//! appeared. The output never contains two entries with the same name.
//!
//! # Example
//!
//! ```rust
//! use ziprename::write::{CompressionMethod, WriteOptions, write_archive};
//! use ziprename::resolve::{ResolvedEntry, Resolution};
//!
//! let entries = vec![ResolvedEntry {
//!     original_path: "01_x.txt".into(),
//!     output_path: "01_intro.txt".into(),
//!     resolution: Resolution::Renamed,
//!     content: b"hello".to_vec(),
//! }];
//!
//! let options = WriteOptions::new().method(CompressionMethod::Stored);
//! let result = write_archive(&entries, &options)?;
//! assert_eq!(result.entries_written, 1);
//! # Ok::<(), ziprename::Error>(())
//! ```

use std::collections::HashMap;
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::resolve::ResolvedEntry;
use crate::{Error, Result};

/// Compression method for output entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompressionMethod {
    /// No compression.
    Stored,
    /// Deflate compression.
    #[cfg(feature = "deflate")]
    Deflated,
}

impl Default for CompressionMethod {
    fn default() -> Self {
        #[cfg(feature = "deflate")]
        return Self::Deflated;
        #[cfg(not(feature = "deflate"))]
        return Self::Stored;
    }
}

impl From<CompressionMethod> for zip::CompressionMethod {
    fn from(method: CompressionMethod) -> Self {
        match method {
            CompressionMethod::Stored => zip::CompressionMethod::Stored,
            #[cfg(feature = "deflate")]
            CompressionMethod::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Options for writing the output archive.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compression method to use.
    pub method: CompressionMethod,
    /// Compression level (0-9). Ignored for [`CompressionMethod::Stored`].
    pub level: u32,
    /// Archive comment.
    pub comment: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            method: CompressionMethod::default(),
            level: 6,
            comment: None,
        }
    }
}

impl WriteOptions {
    /// Creates new write options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression method.
    pub fn method(mut self, method: CompressionMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the compression level (strict validation).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] if level is greater than 9.
    ///
    /// ```rust
    /// use ziprename::write::WriteOptions;
    ///
    /// assert_eq!(WriteOptions::new().level(9)?.level, 9);
    /// assert!(WriteOptions::new().level(15).is_err());
    /// # Ok::<(), ziprename::Error>(())
    /// ```
    pub fn level(mut self, level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the archive comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn file_options(&self, size: usize) -> SimpleFileOptions {
        // Fixed DOS epoch timestamp keeps output deterministic
        let options = SimpleFileOptions::default()
            .compression_method(self.method.into())
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644)
            .large_file(size as u64 >= u32::MAX as u64);
        match self.method {
            CompressionMethod::Stored => options,
            #[allow(unreachable_patterns)]
            _ => options.compression_level(Some(i64::from(self.level))),
        }
    }
}

/// Result of writing an archive.
#[derive(Debug, Clone, Default)]
pub struct WriteResult {
    /// Encoded archive bytes.
    pub bytes: Vec<u8>,
    /// Number of entries in the archive.
    pub entries_written: usize,
    /// Number of input entries replaced by a later entry with the same path.
    pub entries_overwritten: usize,
    /// Total uncompressed size of the written entries.
    pub total_size: u64,
}

impl WriteResult {
    /// Returns the ratio of archive size to uncompressed size.
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.bytes.len() as f64 / self.total_size as f64
        }
    }
}

/// Collapses entries that share an output path.
///
/// Each path keeps the position of its first occurrence and the entry of its
/// last occurrence. Returns the surviving entries and the number dropped.
pub fn dedup_entries(entries: &[ResolvedEntry]) -> (Vec<&ResolvedEntry>, usize) {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
    let mut slots: Vec<&ResolvedEntry> = Vec::with_capacity(entries.len());
    let mut dropped = 0;

    for entry in entries {
        match positions.get(entry.output_path.as_str()) {
            Some(&pos) => {
                log::warn!(
                    "Output path '{}' written twice: '{}' replaces '{}'",
                    entry.output_path,
                    entry.original_path,
                    slots[pos].original_path
                );
                slots[pos] = entry;
                dropped += 1;
            }
            None => {
                positions.insert(entry.output_path.as_str(), slots.len());
                slots.push(entry);
            }
        }
    }

    (slots, dropped)
}

/// Encodes resolved entries into a new zip archive.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the codec rejects an entry or cannot finish
/// the archive.
pub fn write_archive(entries: &[ResolvedEntry], options: &WriteOptions) -> Result<WriteResult> {
    let (slots, dropped) = dedup_entries(entries);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    if let Some(comment) = &options.comment {
        writer.set_comment(comment.clone());
    }

    let mut total_size = 0u64;
    for entry in &slots {
        writer
            .start_file(entry.output_path.as_str(), options.file_options(entry.content.len()))
            .map_err(Error::encode)?;
        writer.write_all(&entry.content).map_err(Error::encode)?;
        total_size += entry.content.len() as u64;
    }

    let bytes = writer.finish().map_err(Error::encode)?.into_inner();
    log::debug!(
        "Wrote archive with {} entries ({} bytes, {} overwritten)",
        slots.len(),
        bytes.len(),
        dropped
    );

    Ok(WriteResult {
        bytes,
        entries_written: slots.len(),
        entries_overwritten: dropped,
        total_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::read_archive;
    use crate::resolve::Resolution;

    fn entry(output: &str, original: &str, content: &[u8]) -> ResolvedEntry {
        ResolvedEntry {
            original_path: original.to_string(),
            output_path: output.to_string(),
            resolution: Resolution::Renamed,
            content: content.to_vec(),
        }
    }

    fn decoded(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        read_archive(bytes)
            .unwrap()
            .into_iter()
            .map(|r| {
                let data = r.content.read().unwrap();
                (r.path, data)
            })
            .collect()
    }

    #[test]
    fn test_writes_in_given_order() {
        let entries = [
            entry("b/2.txt", "x", b"two"),
            entry("a/1.txt", "y", b"one"),
        ];
        let result = write_archive(&entries, &WriteOptions::default()).unwrap();
        assert_eq!(
            decoded(&result.bytes),
            vec![
                ("b/2.txt".to_string(), b"two".to_vec()),
                ("a/1.txt".to_string(), b"one".to_vec()),
            ]
        );
        assert_eq!(result.entries_written, 2);
        assert_eq!(result.total_size, 6);
    }

    #[test]
    fn test_duplicate_path_last_wins_at_first_position() {
        let entries = [
            entry("same.txt", "01_a.txt", b"first"),
            entry("other.txt", "02_b.txt", b"other"),
            entry("same.txt", "01_c.txt", b"last"),
        ];
        let result = write_archive(&entries, &WriteOptions::default()).unwrap();
        assert_eq!(
            decoded(&result.bytes),
            vec![
                ("same.txt".to_string(), b"last".to_vec()),
                ("other.txt".to_string(), b"other".to_vec()),
            ]
        );
        assert_eq!(result.entries_overwritten, 1);
        assert_eq!(result.entries_written, 2);
    }

    #[test]
    fn test_no_directory_entries() {
        let entries = [entry("deep/nested/file.txt", "f", b"data")];
        let result = write_archive(&entries, &WriteOptions::default()).unwrap();
        let records = read_archive(&result.bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_directory);
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let result = write_archive(&[], &WriteOptions::default()).unwrap();
        assert!(read_archive(&result.bytes).unwrap().is_empty());
        assert_eq!(result.compression_ratio(), 1.0);
    }

    #[test]
    fn test_deterministic_output() {
        let entries = [entry("01.txt", "01_x.txt", b"payload")];
        let options = WriteOptions::new().method(CompressionMethod::Stored);
        let first = write_archive(&entries, &options).unwrap();
        let second = write_archive(&entries, &options).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_level_validation() {
        assert!(WriteOptions::new().level(0).is_ok());
        assert!(matches!(
            WriteOptions::new().level(10),
            Err(Error::InvalidCompressionLevel { level: 10 })
        ));
    }

    #[test]
    fn test_comment() {
        let options = WriteOptions::new().comment("renamed");
        let result = write_archive(&[entry("a.txt", "a.txt", b"a")], &options).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(result.bytes)).unwrap();
        assert_eq!(archive.comment(), b"renamed");
    }
}
