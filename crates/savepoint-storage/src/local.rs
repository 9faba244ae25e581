use crate::traits::{EntryStat, FileSystem, StorageError, StorageResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::fs;

/// Local filesystem access through `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let mut entries = fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        Ok(names)
    }

    async fn stat(&self, path: &Path) -> io::Result<EntryStat> {
        let metadata = fs::metadata(path).await?;
        Ok(EntryStat {
            modified: metadata.modified()?,
        })
    }
}

/// Finds the newest entry of a savepoint directory
///
/// Every immediate entry is a candidate; there is no marker filter on this side.
#[derive(Clone)]
pub struct FilesystemBackend {
    fs: Arc<dyn FileSystem>,
}

impl FilesystemBackend {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        FilesystemBackend { fs }
    }

    /// Path of the most recently modified entry of `dir`.
    ///
    /// Entries are visited in name order, so equal modification times resolve to
    /// the lexicographically first name. An empty directory is an error. Names are
    /// joined as raw OS strings; only the winning path is converted to text.
    pub async fn latest_savepoint(&self, dir: &str) -> StorageResult<String> {
        let dir = normalize_dir(dir);
        let dir_path = Path::new(dir);
        let start = std::time::Instant::now();

        let mut names = self
            .fs
            .list_dir(dir_path)
            .await
            .map_err(|source| StorageError::ReadDirFailed {
                path: dir_path.to_path_buf(),
                source,
            })?;

        if names.is_empty() {
            return Err(StorageError::NoSavepoints(dir.to_string()));
        }
        names.sort();

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for name in &names {
            let path = dir_path.join(name);
            let stat = self
                .fs
                .stat(&path)
                .await
                .map_err(|source| StorageError::StatFailed {
                    path: path.clone(),
                    source,
                })?;

            if newest
                .as_ref()
                .map_or(true, |(newest_time, _)| stat.modified > *newest_time)
            {
                newest = Some((stat.modified, path));
            }
        }

        let (_, path) = newest.ok_or_else(|| StorageError::NoSavepoints(dir.to_string()))?;

        tracing::debug!(
            directory = %dir,
            entries = names.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local savepoint listing complete"
        );

        Ok(path.to_string_lossy().into_owned())
    }
}

/// Drop one trailing separator, leaving a bare root untouched.
fn normalize_dir(dir: &str) -> &str {
    if dir.len() > 1 {
        dir.strip_suffix(std::path::is_separator).unwrap_or(dir)
    } else {
        dir
    }
}
