//! Error types for the record navigator.

use std::path::PathBuf;

/// Why a comparison file could not be turned into a record set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input is not well-formed JSON.
    #[error("{message}")]
    Syntax { message: String },

    /// The input is JSON, but its top level is not an array.
    #[error("JSON is not an array (found {found})")]
    NotAnArray { found: &'static str },
}

/// Navigator errors.
#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    /// The file content could not be parsed.
    #[error("invalid JSON file: {0}")]
    Parse(#[from] ParseError),

    /// The file could not be read.
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The file is not a JSON file and was not read.
    #[error("unsupported file type: {}", path.display())]
    UnsupportedFile { path: PathBuf },
}

impl NavigatorError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(_) => 1,
            Self::UnsupportedFile { .. } => 1,
            Self::Io { .. } => 2,
        }
    }
}

/// Result type for navigator operations.
pub type NavResult<T> = Result<T, NavigatorError>;
