//! Error types for archive renaming operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of the rename pipeline, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! Every fallible operation returns `Result<T, Error>`. None of the errors
//! are retried internally: a failure aborts the current operation outright
//! and no partial output is produced.
//!
//! ```rust
//! use ziprename::{Error, read_archive};
//!
//! match read_archive(b"definitely not a zip") {
//!     Ok(records) => println!("{} records", records.len()),
//!     Err(Error::InvalidArchive { reason }) => println!("Not a valid zip: {}", reason),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use std::io;

/// The main error type for archive renaming operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Input | [`InvalidArchive`][Self::InvalidArchive] | Corrupt, truncated or non-zip bytes |
/// | Content | [`ContentRead`][Self::ContentRead] | Entry data fails to decompress or verify |
/// | Output | [`Encode`][Self::Encode] | Output archive cannot be assembled |
/// | Options | [`InvalidCompressionLevel`][Self::InvalidCompressionLevel] | Bad configuration |
/// | I/O | [`Io`][Self::Io] | File system or task failures |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred.
    ///
    /// The library itself works on in-memory buffers; this variant is produced
    /// by callers reading inputs from disk and by failed blocking tasks.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input bytes could not be decoded as a zip archive.
    ///
    /// This covers a missing end-of-central-directory record, a corrupt
    /// central directory, truncated data and non-zip inputs.
    #[error("Invalid zip archive: {reason}")]
    InvalidArchive {
        /// Description reported by the codec.
        reason: String,
    },

    /// The content of an entry could not be materialized.
    ///
    /// Raised lazily, when the entry is read during resolution. Typical causes
    /// are CRC mismatches, unsupported compression methods and truncated
    /// compressed data.
    #[error("Failed to read content of '{path}': {reason}")]
    ContentRead {
        /// Path of the entry inside its archive.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// The output archive could not be assembled.
    #[error("Failed to encode output archive: {reason}")]
    Encode {
        /// Description reported by the codec.
        reason: String,
    },

    /// Invalid compression level specified.
    ///
    /// Valid levels are 0-9.
    #[error("Invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },
}

impl Error {
    /// Returns `true` if the error was caused by damaged input data.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::InvalidArchive { .. } | Self::ContentRead { .. })
    }

    pub(crate) fn invalid_archive(err: zip::result::ZipError) -> Self {
        Self::InvalidArchive {
            reason: err.to_string(),
        }
    }

    pub(crate) fn content_read(path: &str, reason: impl ToString) -> Self {
        Self::ContentRead {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(reason: impl ToString) -> Self {
        Self::Encode {
            reason: reason.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Io(io::Error::other(err))
    }
}

/// A specialized Result type for archive renaming operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_classification() {
        assert!(
            Error::InvalidArchive {
                reason: "eocd".into()
            }
            .is_corruption()
        );
        assert!(Error::content_read("a.txt", "crc").is_corruption());
        assert!(!Error::encode("oom").is_corruption());
        assert!(!Error::InvalidCompressionLevel { level: 12 }.is_corruption());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::content_read("dir/01.txt", "Invalid checksum");
        assert_eq!(
            err.to_string(),
            "Failed to read content of 'dir/01.txt': Invalid checksum"
        );

        let err = Error::InvalidCompressionLevel { level: 10 };
        assert_eq!(err.to_string(), "Invalid compression level 10: must be 0-9");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
