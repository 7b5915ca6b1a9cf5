//! Error types for swarmfix-edit.
//!
//! Absence is never an error here: reading a missing file yields `None` and removing a
//! missing path is a no-op. What remains are genuine failures that must abort the run.

use camino::Utf8PathBuf;
use thiserror::Error;

/// The top-level error type for swarmfix-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// A target path is absolute or climbs out of the repository root.
    #[error("path escapes repository root: {path}")]
    PathEscapesRoot {
        /// The offending path as given.
        path: Utf8PathBuf,
    },

    /// A file that must be rewritten as text is not valid UTF-8.
    #[error("not valid UTF-8: {path}")]
    NotUtf8 {
        /// Repo-relative path of the file.
        path: Utf8PathBuf,
    },

    /// An I/O or other runtime failure.
    #[error("runtime error: {0:#}")]
    Runtime(#[from] anyhow::Error),
}

impl EditError {
    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;
