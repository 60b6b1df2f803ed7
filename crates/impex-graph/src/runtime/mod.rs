//! Platform runtime abstraction.
//!
//! The engine never touches the filesystem directly: all reads go through the
//! [`Runtime`] trait so hosts can supply virtual file systems (in-memory
//! fixtures, LSP overlays) and so every filesystem probe the resolver makes
//! is mockable in tests.

pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error.
    #[error("runtime error: {0}")]
    Other(String),
}

/// File metadata.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes.
    pub size: u64,
    /// Whether this is a directory.
    pub is_dir: bool,
    /// Whether this is a file.
    pub is_file: bool,
    /// Last modified timestamp (milliseconds since epoch).
    pub modified: Option<u64>,
}

/// Platform runtime trait.
///
/// Existence probes are synchronous because the resolver issues many of them
/// on hot paths; reads and directory listings are async.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file's contents.
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Get file metadata.
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// List the names of a directory's entries.
    async fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Get the current working directory.
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;
}
