//! Metadata provider error types.

use std::io;
use thiserror::Error;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised by a metadata provider.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Failed to read a catalog from disk.
    #[error("failed to read catalog: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse a catalog document.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog describes the same table twice.
    #[error("duplicate table in catalog: {0}")]
    DuplicateTable(String),

    /// The backing search index or store failed.
    #[error("metadata backend error: {0}")]
    Backend(String),
}

impl MetadataError {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
