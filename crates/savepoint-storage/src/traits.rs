//! Storage abstraction traits
//!
//! This module defines the error type shared by both backends and the two seams
//! the backends are built on: paginated object listing and directory access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Savepoint resolution errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("listing S3 objects: {0}")]
    ListFailed(String),

    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat {}: {source}", path.display())]
    StatFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No savepoints present in directory: {0}")]
    NoSavepoints(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A single object returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a listing, with the token needed to request the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub objects: Vec<ObjectEntry>,
    pub next_continuation_token: Option<String>,
}

/// Paginated object listing
///
/// Implementations return one page per call. Callers keep requesting pages,
/// passing back `next_continuation_token`, until it comes back as `None`.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> StorageResult<ObjectPage>;
}

/// Metadata of a single directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    pub modified: SystemTime,
}

/// Read-only filesystem access used by the local backend
///
/// Kept to the two calls the backend needs so tests can swap in an
/// in-memory tree instead of touching disk.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Names of the immediate entries of `path`, in no particular order.
    ///
    /// Names are returned as the OS reports them; they need not be UTF-8.
    async fn list_dir(&self, path: &Path) -> std::io::Result<Vec<OsString>>;

    /// Stat a single entry.
    async fn stat(&self, path: &Path) -> std::io::Result<EntryStat>;
}
