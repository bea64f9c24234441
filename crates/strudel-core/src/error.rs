//! Error types for manifest generation.
//!
//! Each variant names the path involved so the message can be shown
//! to the operator as-is.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail during generation.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Things that can go wrong when generating a manifest.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// The root path does not exist.
    #[error("the specified path '{0}' does not exist")]
    PathNotFound(PathBuf),

    /// The root path exists but is a file or something else.
    #[error("the specified path '{0}' is not a directory")]
    PathNotDirectory(PathBuf),

    /// Neither a base URL nor a GitHub user and repository were given.
    #[error("either --base-url or both --username and --repo must be provided")]
    MissingUrlSource,

    /// The root directory could not be listed.
    #[error("error scanning directory '{path}': {source}")]
    RootScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be written.
    #[error("error writing to file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure while inspecting the root.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
