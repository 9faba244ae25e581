//! In-memory doubles for the listing and filesystem seams

use crate::traits::{
    EntryStat, FileSystem, ObjectEntry, ObjectLister, ObjectPage, StorageError, StorageResult,
};
use async_trait::async_trait;
use chrono::DateTime;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Object entry modified `secs` seconds after the epoch.
pub fn object(key: &str, secs: i64) -> ObjectEntry {
    ObjectEntry {
        key: key.to_string(),
        last_modified: DateTime::from_timestamp(secs, 0),
    }
}

/// Arguments of one `list_page` call, kept for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub continuation_token: Option<String>,
}

/// Serves a fixed sequence of pages. Page `n` is requested with token `page-n`.
pub struct PagedObjectLister {
    pages: Vec<Vec<ObjectEntry>>,
    failure: Option<String>,
    requests: Mutex<Vec<ListRequest>>,
}

impl PagedObjectLister {
    pub fn new(pages: Vec<Vec<ObjectEntry>>) -> Self {
        Self {
            pages,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn single_page(objects: Vec<ObjectEntry>) -> Self {
        Self::new(vec![objects])
    }

    /// Every call fails with `ListFailed(message)`.
    pub fn failing(message: &str) -> Self {
        Self {
            pages: Vec::new(),
            failure: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectLister for PagedObjectLister {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> StorageResult<ObjectPage> {
        self.requests.lock().unwrap().push(ListRequest {
            bucket: bucket.to_string(),
            prefix: prefix.map(str::to_string),
            continuation_token: continuation_token.clone(),
        });

        if let Some(ref message) = self.failure {
            return Err(StorageError::ListFailed(message.clone()));
        }

        let index = match continuation_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| StorageError::ListFailed(format!("unknown token {}", token)))?,
        };

        let objects = self.pages.get(index).cloned().unwrap_or_default();
        let next_continuation_token =
            (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }
}

/// Directory tree held in memory. Directories map to `(name, mtime)` entries.
#[derive(Default)]
pub struct MemoryFileSystem {
    dirs: Mutex<HashMap<PathBuf, Vec<(String, SystemTime)>>>,
    broken: Mutex<HashSet<PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directory.
    pub fn add_dir(&self, dir: impl AsRef<Path>) {
        self.dirs
            .lock()
            .unwrap()
            .entry(dir.as_ref().to_path_buf())
            .or_default();
    }

    /// Add an entry modified `secs` seconds after the epoch, creating `dir` if needed.
    pub fn add_entry(&self, dir: impl AsRef<Path>, name: &str, secs: u64) {
        self.dirs
            .lock()
            .unwrap()
            .entry(dir.as_ref().to_path_buf())
            .or_default()
            .push((name.to_string(), UNIX_EPOCH + Duration::from_secs(secs)));
    }

    /// Make `stat` on this path fail with a permission error.
    pub fn break_entry(&self, path: impl AsRef<Path>) {
        self.broken
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        self.dirs
            .lock()
            .unwrap()
            .get(path)
            .map(|entries| entries.iter().map(|(name, _)| OsString::from(name)).collect())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
    }

    async fn stat(&self, path: &Path) -> io::Result<EntryStat> {
        if self.broken.lock().unwrap().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }

        let not_found = || io::Error::new(io::ErrorKind::NotFound, "no such entry");
        let parent = path.parent().ok_or_else(not_found)?;
        let name = path.file_name().ok_or_else(not_found)?;

        self.dirs
            .lock()
            .unwrap()
            .get(parent)
            .and_then(|entries| entries.iter().find(|(n, _)| name == n.as_str()))
            .map(|(_, modified)| EntryStat {
                modified: *modified,
            })
            .ok_or_else(not_found)
    }
}
