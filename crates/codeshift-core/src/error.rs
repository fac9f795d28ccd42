//! Error types and exit codes for codeshift.
//!
//! This module provides the unified error type (`ShiftError`) raised by the
//! transformer and runner. Errors propagate to the caller by default so that a
//! partially transformed tree is never written to disk; the only built-in
//! recovery path is the runner's secured execution.
//!
//! ## Exit Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (input file or codemod manifest not found)
//! - `4`: Load errors (corrupt codemod manifest)
//! - `5`: Parse errors (source text rejected by the toolkit)
//! - `6`: Codemod failures (setup, hook or traversal step raised an error)
//! - `10`: Internal errors (I/O, unexpected state)

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable numeric codes used as process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Input path or codemod manifest does not exist.
    ResolutionError = 3,
    /// Codemod manifest exists but cannot be turned into a codemod.
    LoadError = 4,
    /// Source text could not be parsed.
    ParseError = 5,
    /// A codemod raised an error while running.
    CodemodFailed = 6,
    /// Internal errors (I/O, bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the codemod pipeline.
#[derive(Debug, Error)]
pub enum ShiftError {
    /// Input file or directory is missing, or is not the expected kind.
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// Codemod manifest path does not exist.
    #[error("codemod not found: {}", .path.display())]
    CodemodNotFound { path: PathBuf },

    /// Codemod manifest exists but yields no usable codemod.
    #[error("corrupt codemod {}: {reason}", .path.display())]
    CorruptCodemod { path: PathBuf, reason: String },

    /// Source text rejected by the parser.
    #[error("parse error{} at {line}:{column}: {message}", describe_file(.file))]
    Parse {
        file: Option<PathBuf>,
        message: String,
        line: u32,
        column: u32,
    },

    /// A codemod hook, traversal step, or setup raised an error.
    #[error("codemod execution failed{}: {source:#}", describe_file(.file))]
    CodemodFailed {
        file: Option<PathBuf>,
        #[source]
        source: anyhow::Error,
    },

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },
}

fn describe_file(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

/// Result type for pipeline operations.
pub type ShiftResult<T> = Result<T, ShiftError>;

impl ShiftError {
    /// Create a file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        ShiftError::FileNotFound { path: path.into() }
    }

    /// Create a corrupt-codemod error.
    pub fn corrupt_codemod(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ShiftError::CorruptCodemod {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ShiftError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: &Path, source: io::Error) -> Self {
        ShiftError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error means a required path was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ShiftError::FileNotFound { .. } | ShiftError::CodemodNotFound { .. }
        )
    }

    /// The file this error is about, when known.
    pub fn file(&self) -> Option<&Path> {
        match self {
            ShiftError::FileNotFound { path }
            | ShiftError::CodemodNotFound { path }
            | ShiftError::CorruptCodemod { path, .. }
            | ShiftError::Io { path, .. } => Some(path),
            ShiftError::Parse { file, .. } | ShiftError::CodemodFailed { file, .. } => {
                file.as_deref()
            }
            ShiftError::InvalidArguments { .. } => None,
        }
    }
}

impl From<&ShiftError> for OutputErrorCode {
    fn from(err: &ShiftError) -> Self {
        match err {
            ShiftError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            ShiftError::CodemodNotFound { .. } => OutputErrorCode::ResolutionError,
            ShiftError::CorruptCodemod { .. } => OutputErrorCode::LoadError,
            ShiftError::Parse { .. } => OutputErrorCode::ParseError,
            ShiftError::CodemodFailed { .. } => OutputErrorCode::CodemodFailed,
            ShiftError::Io { .. } => OutputErrorCode::InternalError,
            ShiftError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
        }
    }
}

impl From<ShiftError> for OutputErrorCode {
    fn from(err: ShiftError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn codes_map_to_exit_values() {
        assert_eq!(
            OutputErrorCode::from(&ShiftError::file_not_found("a.php")).code(),
            3
        );
        assert_eq!(
            OutputErrorCode::from(&ShiftError::corrupt_codemod("m.toml", "bad")).code(),
            4
        );
        assert_eq!(OutputErrorCode::InternalError.to_string(), "10");
    }

    #[test]
    fn parse_error_names_file_when_known() {
        let err = ShiftError::Parse {
            file: Some(PathBuf::from("/src/a.php")),
            message: "unexpected `}`".to_string(),
            line: 3,
            column: 1,
        };
        assert_eq!(
            err.to_string(),
            "parse error in /src/a.php at 3:1: unexpected `}`"
        );

        let err = ShiftError::Parse {
            file: None,
            message: "missing `;`".to_string(),
            line: 1,
            column: 9,
        };
        assert_eq!(err.to_string(), "parse error at 1:9: missing `;`");
    }

    #[test]
    fn codemod_failure_keeps_cause() {
        let err = ShiftError::CodemodFailed {
            file: Some(PathBuf::from("b.php")),
            source: anyhow::anyhow!("boom").context("while finishing"),
        };
        assert_eq!(
            err.to_string(),
            "codemod execution failed in b.php: while finishing: boom"
        );
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("while finishing".to_string())
        );
        assert_eq!(err.file(), Some(Path::new("b.php")));
    }

    #[test]
    fn not_found_covers_both_kinds() {
        assert!(ShiftError::file_not_found("x").is_not_found());
        assert!(ShiftError::CodemodNotFound {
            path: PathBuf::from("m.toml")
        }
        .is_not_found());
        assert!(!ShiftError::invalid_arguments("nope").is_not_found());
    }
}
