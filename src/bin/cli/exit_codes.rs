//! Exit codes for the CLI tool.

use ziprename::{Error, PipelineError, Stage};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Operation completed with warnings
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a ziprename error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidArchive { .. } | Error::ContentRead { .. } => ExitCode::BadArchive,
        Error::Encode { .. } => ExitCode::FatalError,
        Error::InvalidCompressionLevel { .. } => ExitCode::BadArgs,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}

/// Converts a failed pipeline stage to an exit code
pub fn stage_to_exit_code(stage: Stage) -> ExitCode {
    match stage {
        Stage::Select(_) | Stage::ReadSource | Stage::ReadTarget | Stage::Resolve => {
            ExitCode::BadArchive
        }
        Stage::Write => ExitCode::FatalError,
    }
}

/// Converts a pipeline error to an exit code
pub fn pipeline_error_to_exit_code(error: &PipelineError) -> ExitCode {
    match &error.error {
        Error::Io(_) => ExitCode::IoError,
        _ => stage_to_exit_code(error.stage),
    }
}
