//! Savepoint directory classification.
//!
//! A directory string is either an object-store URI (`s3://bucket/prefix`, with the
//! `s3a` and `s3p` aliases) or a filesystem path. Classification never fails: anything
//! that does not parse as a URI with a recognized scheme is treated as a path.

use url::Url;

/// URI schemes that address the S3 backend.
pub const OBJECT_STORE_SCHEMES: [&str; 3] = ["s3", "s3a", "s3p"];

/// A bucket and optional key prefix inside an S3-compatible store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreLocation {
    /// Scheme as written by the caller, reused when rebuilding object URIs.
    pub scheme: String,
    pub bucket: String,
    /// Key prefix with leading `/` removed; `None` lists the whole bucket.
    pub prefix: Option<String>,
}

impl ObjectStoreLocation {
    /// Full URI for an object key in this location's bucket.
    ///
    /// Each `/`-separated segment of the key is percent-encoded, so parsing the
    /// result yields the key back as the prefix.
    pub fn object_uri(&self, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(urlencoding::encode)
            .collect::<Vec<_>>()
            .join("/");
        format!("{}://{}/{}", self.scheme, self.bucket, encoded)
    }
}

/// Where a savepoint directory lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavepointLocation {
    ObjectStore(ObjectStoreLocation),
    Filesystem(String),
}

impl SavepointLocation {
    /// Classify a directory string. Pure, no I/O.
    pub fn parse(dir: &str) -> Self {
        match Url::parse(dir) {
            Ok(url) if OBJECT_STORE_SCHEMES.contains(&url.scheme()) => {
                let raw_path = url.path().trim_start_matches('/');
                let prefix = urlencoding::decode(raw_path)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| raw_path.to_string());

                SavepointLocation::ObjectStore(ObjectStoreLocation {
                    scheme: url.scheme().to_string(),
                    bucket: url.host_str().unwrap_or_default().to_string(),
                    prefix: (!prefix.is_empty()).then_some(prefix),
                })
            }
            _ => SavepointLocation::Filesystem(dir.to_string()),
        }
    }

    pub fn is_object_store(&self) -> bool {
        matches!(self, SavepointLocation::ObjectStore(_))
    }
}
