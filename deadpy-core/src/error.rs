//! Typed error handling for deadpy.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deadpy operations.
///
/// This provides typed errors that library consumers can match on,
/// unlike opaque `anyhow::Error` types.
#[derive(Error, Debug)]
pub enum DeadpyError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Import extraction failed for a source file
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// An entry point does not exist or is not a file
    #[error("Entry point not found: {path}")]
    EntryPoint { path: PathBuf },

    /// No valid entry points and/or no source files to analyze
    #[error("Nothing to analyze under {root}: {message}")]
    NothingToAnalyze { root: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl DeadpyError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing-entry-point error.
    pub fn entry_point(path: impl Into<PathBuf>) -> Self {
        Self::EntryPoint { path: path.into() }
    }

    /// Create a nothing-to-analyze error.
    pub fn nothing_to_analyze(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::NothingToAnalyze {
            root: root.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (can continue analysis).
    ///
    /// Parse failures and missing entry points are reported per file and the
    /// run continues; the remaining variants abort it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::EntryPoint { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Parse { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::EntryPoint { path } => Some(path),
            Self::NothingToAnalyze { root, .. } => Some(root),
            Self::InvalidArgument { .. } => None,
        }
    }
}

/// Convenience type alias for deadpy results.
pub type DeadpyResult<T> = Result<T, DeadpyError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DeadpyResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DeadpyResult<T> {
        self.map_err(|e| DeadpyError::io(path, e))
    }
}
