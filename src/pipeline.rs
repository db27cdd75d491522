//! Run coordination: from two input archives to one renamed archive.
//!
//! The [`Coordinator`] holds the selected source and target archives and the
//! single active [`Outcome`]. A run goes through four stages in dependency
//! order: both inputs are decoded (concurrently), the source index is built,
//! target entries are resolved, and the output archive is written.
//!
//! Runs are split into [`Coordinator::start_run`], [`RunTicket::execute`] and
//! [`Coordinator::settle`] so that a run can execute while the coordinator
//! keeps accepting input changes. Every run and every input change bumps a
//! generation counter; a report whose generation is no longer current is
//! discarded when settled, so the most recently started run always decides
//! the outcome.
//!
//! # Example
//!
//! ```rust,no_run
//! use ziprename::pipeline::{Coordinator, Outcome};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut coordinator = Coordinator::default();
//! coordinator.select_source("source.zip", std::fs::read("source.zip")?)?;
//! coordinator.select_target("target.zip", std::fs::read("target.zip")?)?;
//!
//! match coordinator.process().await {
//!     Outcome::Success(artifact) => std::fs::write(&artifact.file_name, &artifact.bytes)?,
//!     Outcome::Failure { message, .. } => eprintln!("{}", message),
//!     _ => {}
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::index::SourceIndex;
use crate::read::{ArchiveListing, read_shared};
use crate::resolve::{RenameReport, ResolveOptions, resolve, resolve_async};
use crate::write::{WriteOptions, WriteResult, write_archive};
use crate::{Error, Result};

/// Default prefix of the output archive file name.
pub const DEFAULT_ARTIFACT_PREFIX: &str = "renamed_";

/// Which of the two inputs an operation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The archive providing canonical file names.
    Source,
    /// The archive whose files are renamed.
    Target,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// The operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Validating an archive when it is selected.
    Select(Role),
    /// Decoding the source archive during a run.
    ReadSource,
    /// Decoding the target archive during a run.
    ReadTarget,
    /// Reading target contents and deciding output paths.
    Resolve,
    /// Encoding the output archive.
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(role) => write!(f, "load {} archive", role),
            Self::ReadSource => write!(f, "read source archive"),
            Self::ReadTarget => write!(f, "read target archive"),
            Self::Resolve => write!(f, "resolve renamed entries"),
            Self::Write => write!(f, "write output archive"),
        }
    }
}

/// An error tagged with the stage that produced it.
#[derive(Debug, thiserror::Error)]
#[error("Failed to {stage}: {error}")]
pub struct PipelineError {
    /// The failing stage.
    pub stage: Stage,
    /// The underlying error.
    #[source]
    pub error: Error,
}

impl PipelineError {
    /// Creates a new pipeline error.
    pub fn new(stage: Stage, error: Error) -> Self {
        Self { stage, error }
    }
}

/// The renamed archive produced by a successful run.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Encoded zip archive.
    pub bytes: Vec<u8>,
    /// Suggested file name for saving the archive.
    pub file_name: String,
    /// What happened to the target files.
    pub report: RenameReport,
    /// Archive size relative to the uncompressed size of its entries.
    pub compression_ratio: f64,
}

/// The state of the coordinator. Exactly one is active at a time.
#[derive(Debug, Clone, Default)]
pub enum Outcome {
    /// Nothing has run since the inputs last changed.
    #[default]
    Idle,
    /// A run has started and not yet settled.
    Processing,
    /// The latest run succeeded.
    Success(Artifact),
    /// The latest run or selection failed.
    Failure {
        /// The failing stage.
        stage: Stage,
        /// User-facing message naming the failed operation.
        message: String,
    },
}

impl Outcome {
    /// Returns `true` for [`Outcome::Idle`].
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` for [`Outcome::Processing`].
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }

    /// Returns the artifact of a successful run.
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Success(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// Options for a rename run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Output archive options.
    pub write: WriteOptions,
    /// Content reading options.
    pub resolve: ResolveOptions,
    /// Prefix of the suggested artifact file name.
    pub artifact_prefix: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            write: WriteOptions::default(),
            resolve: ResolveOptions::default(),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
        }
    }
}

impl PipelineOptions {
    /// Creates options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output archive options.
    pub fn write(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }

    /// Sets the content reading options.
    pub fn resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }

    /// Sets the artifact file name prefix.
    pub fn artifact_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.artifact_prefix = prefix.into();
        self
    }
}

/// Builds the suggested file name of the output archive.
///
/// The target's name is used as is, so `photos.zip` becomes
/// `renamed_photos.zip.zip`. An empty name falls back to `files`.
pub fn artifact_file_name(prefix: &str, target_name: &str) -> String {
    let name = if target_name.is_empty() {
        "files"
    } else {
        target_name
    };
    format!("{}{}.zip", prefix, name)
}

/// An accepted input archive.
#[derive(Debug, Clone)]
pub struct InputArchive {
    name: String,
    bytes: Arc<[u8]>,
    listing: ArchiveListing,
}

impl InputArchive {
    /// Decodes the bytes once to validate them and list their files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchive`] if the bytes are not a zip archive.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes: Vec<u8> = bytes.into();
        let bytes: Arc<[u8]> = Arc::from(bytes);
        let records = read_shared(Arc::clone(&bytes))?;
        Ok(Self {
            name: name.into(),
            listing: ArchiveListing::from_records(&records),
            bytes,
        })
    }

    /// Original file name of the archive.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw archive bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sorted file paths in the archive.
    pub fn listing(&self) -> &ArchiveListing {
        &self.listing
    }
}

/// Holds the inputs and the outcome of the latest run.
#[derive(Debug, Default)]
pub struct Coordinator {
    source: Option<InputArchive>,
    target: Option<InputArchive>,
    outcome: Outcome,
    generation: u64,
    options: PipelineOptions,
}

impl Coordinator {
    /// Creates a coordinator with the given options.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Selects the source archive.
    ///
    /// Resets the outcome to [`Outcome::Idle`] and invalidates any run in
    /// flight. If the bytes are not a valid archive, the source selection is
    /// cleared, the outcome becomes [`Outcome::Failure`] and the error is
    /// returned. The target selection is never affected.
    pub fn select_source(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> std::result::Result<&InputArchive, PipelineError> {
        self.select(Role::Source, name.into(), bytes.into())
    }

    /// Selects the target archive. See [`select_source`](Self::select_source).
    pub fn select_target(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> std::result::Result<&InputArchive, PipelineError> {
        self.select(Role::Target, name.into(), bytes.into())
    }

    /// Clears the source selection and resets the outcome.
    pub fn clear_source(&mut self) {
        self.reset();
        self.source = None;
    }

    /// Clears the target selection and resets the outcome.
    pub fn clear_target(&mut self) {
        self.reset();
        self.target = None;
    }

    fn select(
        &mut self,
        role: Role,
        name: String,
        bytes: Vec<u8>,
    ) -> std::result::Result<&InputArchive, PipelineError> {
        self.reset();
        let slot = match role {
            Role::Source => &mut self.source,
            Role::Target => &mut self.target,
        };

        match InputArchive::new(name, bytes) {
            Ok(input) => {
                log::debug!(
                    "Selected {} archive '{}' with {} files",
                    role,
                    input.name,
                    input.listing.len()
                );
                Ok(slot.insert(input))
            }
            Err(error) => {
                *slot = None;
                let error = PipelineError::new(Stage::Select(role), error);
                self.outcome = Outcome::Failure {
                    stage: error.stage,
                    message: error.to_string(),
                };
                Err(error)
            }
        }
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.outcome = Outcome::Idle;
    }

    /// The selected source archive.
    pub fn source(&self) -> Option<&InputArchive> {
        self.source.as_ref()
    }

    /// The selected target archive.
    pub fn target(&self) -> Option<&InputArchive> {
        self.target.as_ref()
    }

    /// The current outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// The run options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Starts a run over the current inputs.
    ///
    /// Returns `None` without changing anything unless both inputs are
    /// selected. Otherwise the outcome becomes [`Outcome::Processing`] and
    /// every earlier run becomes stale.
    pub fn start_run(&mut self) -> Option<RunTicket> {
        let (source, target) = match (&self.source, &self.target) {
            (Some(source), Some(target)) => (source, target),
            _ => return None,
        };

        self.generation += 1;
        let ticket = RunTicket {
            generation: self.generation,
            source: Arc::clone(&source.bytes),
            target: Arc::clone(&target.bytes),
            target_name: target.name.clone(),
            options: self.options.clone(),
        };
        self.outcome = Outcome::Processing;
        log::debug!("Started run {}", ticket.generation);
        Some(ticket)
    }

    /// Applies a run report.
    ///
    /// Returns `false` and leaves the outcome untouched if the run is stale,
    /// that is, another run started or an input changed after it.
    pub fn settle(&mut self, report: RunReport) -> bool {
        if report.generation != self.generation {
            log::debug!(
                "Discarding stale run {} (current generation {})",
                report.generation,
                self.generation
            );
            return false;
        }

        self.outcome = match report.result {
            Ok(artifact) => Outcome::Success(artifact),
            Err(error) => {
                log::debug!("Run {} failed: {}", report.generation, error);
                Outcome::Failure {
                    stage: error.stage,
                    message: error.to_string(),
                }
            }
        };
        true
    }

    /// Runs the pipeline to completion over the current inputs.
    ///
    /// Does nothing unless both inputs are selected.
    pub async fn process(&mut self) -> &Outcome {
        if let Some(ticket) = self.start_run() {
            let report = ticket.execute().await;
            self.settle(report);
        }
        &self.outcome
    }
}

/// A started run, independent of the coordinator that created it.
#[derive(Debug, Clone)]
pub struct RunTicket {
    generation: u64,
    source: Arc<[u8]>,
    target: Arc<[u8]>,
    target_name: String,
    options: PipelineOptions,
}

/// The settled result of a run, to be passed to [`Coordinator::settle`].
#[derive(Debug)]
pub struct RunReport {
    generation: u64,
    /// The run result.
    pub result: std::result::Result<Artifact, PipelineError>,
}

impl RunReport {
    /// Generation of the run that produced this report.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl RunTicket {
    /// Generation of this run.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Executes all stages of the run.
    pub async fn execute(self) -> RunReport {
        let generation = self.generation;
        RunReport {
            generation,
            result: self.run().await,
        }
    }

    async fn run(self) -> std::result::Result<Artifact, PipelineError> {
        let source = self.source;
        let target = self.target;
        let (source_records, target_records) = tokio::try_join!(
            blocking(Stage::ReadSource, move || read_shared(source)),
            blocking(Stage::ReadTarget, move || read_shared(target)),
        )?;

        let index = SourceIndex::build(&source_records);
        let entries = resolve_async(&target_records, &index, &self.options.resolve)
            .await
            .map_err(|e| PipelineError::new(Stage::Resolve, e))?;
        let mut report = RenameReport::from_entries(&entries);

        let write_options = self.options.write;
        let written = blocking(Stage::Write, move || {
            write_archive(&entries, &write_options)
        })
        .await?;
        report.overwritten = written.entries_overwritten;

        log::debug!(
            "Run {} renamed {} of {} files",
            self.generation,
            report.renamed,
            report.total()
        );
        Ok(Artifact {
            compression_ratio: written.compression_ratio(),
            bytes: written.bytes,
            file_name: artifact_file_name(&self.options.artifact_prefix, &self.target_name),
            report,
        })
    }
}

async fn blocking<T, F>(stage: Stage, f: F) -> std::result::Result<T, PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(Error::from)
        .and_then(|result| result)
        .map_err(|e| PipelineError::new(stage, e))
}

/// Renames the files of `target` after the files of `source` without an
/// async runtime.
///
/// Runs the same stages as [`Coordinator::process`], reading content
/// sequentially.
pub fn rename_archives(
    source: &[u8],
    target: &[u8],
    options: &WriteOptions,
) -> std::result::Result<(WriteResult, RenameReport), PipelineError> {
    let source_records = read_shared(Arc::from(source))
        .map_err(|e| PipelineError::new(Stage::ReadSource, e))?;
    let target_records = read_shared(Arc::from(target))
        .map_err(|e| PipelineError::new(Stage::ReadTarget, e))?;

    let index = SourceIndex::build(&source_records);
    let entries =
        resolve(&target_records, &index).map_err(|e| PipelineError::new(Stage::Resolve, e))?;
    let mut report = RenameReport::from_entries(&entries);

    let written =
        write_archive(&entries, options).map_err(|e| PipelineError::new(Stage::Write, e))?;
    report.overwritten = written.entries_overwritten;
    Ok((written, report))
}
