//! Error types for the asset cache.

use crate::worker::WorkerState;

/// Asset cache errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The network request could not be completed.
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A manifest resource answered with a non-success status during install.
    #[error("install failed: {url} returned HTTP {status}")]
    Install { url: String, status: u16 },

    /// Bucket storage failed.
    #[error("cache error: {message}")]
    Cache { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The operation is not allowed in the worker's current state.
    #[error("cannot {action} while worker is {state}")]
    Lifecycle {
        action: &'static str,
        state: WorkerState,
    },
}

impl CacheError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,

            Self::Fetch { .. } => 3,
            Self::Install { .. } => 3,
            Self::Cache { .. } => 3,

            Self::Lifecycle { .. } => 4,
        }
    }

    /// Whether the error came from the network rather than local state.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Install { .. })
    }

    pub(crate) fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }
}

/// Result type for asset cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
