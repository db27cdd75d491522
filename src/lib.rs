//! # ziprename
//!
//! Rename the files of one zip archive after the files of another.
//!
//! Files are matched by the number at the start of their name. Every file of
//! the *target* archive whose leading number also starts a file name in the
//! *source* archive is renamed to that source file's full path; all other
//! target files keep their path. Contents are copied byte for byte.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ziprename::{WriteOptions, rename_archives};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = std::fs::read("chapters.zip")?;
//!     let target = std::fs::read("scans.zip")?;
//!
//!     let (written, report) = rename_archives(&source, &target, &WriteOptions::default())?;
//!     println!("Renamed {} of {} files", report.renamed, report.total());
//!     std::fs::write("renamed_scans.zip", &written.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! With a source archive holding `001_intro.pdf` and `002_body.pdf`, and a
//! target archive holding `001_x.pdf`, `002_y.pdf` and `003_z.pdf`, the output
//! holds `001_intro.pdf`, `002_body.pdf` (with the contents of `001_x.pdf` and
//! `002_y.pdf`) and the untouched `003_z.pdf`.
//!
//! ## Building Blocks
//!
//! | Step | Module | Entry point |
//! |------|--------|-------------|
//! | Identifier extraction | [`identifier`] | [`extract_identifier`] |
//! | Archive decoding | [`read`] | [`read_archive`] |
//! | Source lookup table | [`index`] | [`SourceIndex::build`] |
//! | Rename resolution | [`resolve`] | [`resolve()`], [`resolve_async`] |
//! | Archive encoding | [`write`] | [`write_archive`] |
//! | Run coordination | [`pipeline`] | [`Coordinator`] |
//!
//! ## Async Coordination
//!
//! The [`Coordinator`] keeps the two selected inputs and the outcome of the
//! latest run. Runs decode both inputs concurrently and read target entries
//! concurrently while preserving their order:
//!
//! ```rust,no_run
//! use ziprename::{Coordinator, Outcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut coordinator = Coordinator::default();
//!     coordinator.select_source("chapters.zip", std::fs::read("chapters.zip")?)?;
//!     coordinator.select_target("scans.zip", std::fs::read("scans.zip")?)?;
//!
//!     if let Outcome::Success(artifact) = coordinator.process().await {
//!         std::fs::write(&artifact.file_name, &artifact.bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `deflate` | Yes | Deflate compression for input and output entries |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade. Rename
//! decisions are logged at `trace` level, duplicate identifiers and
//! duplicate output paths at `warn` level.

pub mod error;
pub mod identifier;
pub mod index;
pub mod pipeline;
pub mod read;
pub mod resolve;
pub mod write;

pub use error::{Error, Result};
pub use identifier::{Identifier, extract_identifier};
pub use index::SourceIndex;
pub use pipeline::{
    Artifact, Coordinator, InputArchive, Outcome, PipelineError, PipelineOptions, Role, RunReport,
    RunTicket, Stage, rename_archives,
};
pub use read::{ArchiveListing, ArchiveRecord, ContentHandle, read_archive};
pub use resolve::{
    RenameReport, Resolution, ResolveOptions, ResolvedEntry, resolve, resolve_async,
};
pub use write::{CompressionMethod, WriteOptions, WriteResult, write_archive};
