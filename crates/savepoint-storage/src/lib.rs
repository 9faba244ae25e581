//! Savepoint Storage Library
//!
//! Locates the most recent savepoint of a streaming job inside a directory that
//! lives either on a local/mounted filesystem or in an S3-compatible object store.
//!
//! # Directory forms
//!
//! - **Object store**: `s3://bucket/prefix` (also `s3a://` and `s3p://`). Every
//!   object under the prefix is listed and the newest `_metadata` marker wins. A
//!   prefix without markers resolves to `None`.
//! - **Filesystem**: any other string. The newest immediate entry of the directory
//!   wins; an empty directory is an error.
//!
//! [`SavepointResolver`] classifies the directory and dispatches to the backend.

pub mod config;
pub mod local;
pub mod location;
pub mod object_store;
pub mod resolver;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use config::ObjectStoreConfig;
pub use local::{FilesystemBackend, TokioFileSystem};
pub use location::{ObjectStoreLocation, SavepointLocation, OBJECT_STORE_SCHEMES};
pub use object_store::{ObjectStoreBackend, METADATA_MARKER_SUFFIX};
pub use resolver::SavepointResolver;
#[cfg(feature = "storage-s3")]
pub use s3::S3Lister;
pub use traits::{
    EntryStat, FileSystem, ObjectEntry, ObjectLister, ObjectPage, StorageError, StorageResult,
};
