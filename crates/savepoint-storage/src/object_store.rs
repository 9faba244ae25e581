use crate::location::ObjectStoreLocation;
use crate::traits::{ObjectLister, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Key suffix of the file that marks a savepoint as complete.
pub const METADATA_MARKER_SUFFIX: &str = "_metadata";

/// Finds the newest savepoint marker under a bucket/prefix
pub struct ObjectStoreBackend {
    lister: Arc<dyn ObjectLister>,
}

impl ObjectStoreBackend {
    pub fn new(lister: Arc<dyn ObjectLister>) -> Self {
        ObjectStoreBackend { lister }
    }

    /// URI of the most recently modified `_metadata` object, or `None` when the
    /// bucket/prefix holds no marker at all.
    ///
    /// Every page of the listing is read before a winner is picked. Ties keep the
    /// object seen first.
    pub async fn latest_savepoint(
        &self,
        location: &ObjectStoreLocation,
    ) -> StorageResult<Option<String>> {
        if location.bucket.is_empty() {
            return Err(StorageError::InvalidLocation(format!(
                "{}:// location has no bucket",
                location.scheme
            )));
        }

        let start = std::time::Instant::now();
        let mut newest: Option<(DateTime<Utc>, String)> = None;
        let mut continuation_token = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .lister
                .list_page(
                    &location.bucket,
                    location.prefix.as_deref(),
                    continuation_token.take(),
                )
                .await?;
            pages += 1;

            for object in page.objects {
                if !object.key.ends_with(METADATA_MARKER_SUFFIX) {
                    continue;
                }
                let Some(modified) = object.last_modified else {
                    continue;
                };
                if newest.as_ref().map_or(true, |(newest_time, _)| modified > *newest_time) {
                    newest = Some((modified, object.key));
                }
            }

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            bucket = %location.bucket,
            prefix = ?location.prefix,
            pages,
            found = newest.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 savepoint listing complete"
        );

        Ok(newest.map(|(_, key)| location.object_uri(&key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{object, PagedObjectLister};
    use crate::traits::ObjectEntry;
    use crate::SavepointLocation;

    fn location(dir: &str) -> ObjectStoreLocation {
        match SavepointLocation::parse(dir) {
            SavepointLocation::ObjectStore(location) => location,
            other => panic!("not an object store location: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_latest_marker_wins_and_other_suffixes_are_ignored() {
        let lister = PagedObjectLister::single_page(vec![
            object("a/_metadata", 100),
            object("b/_metadata", 200),
            object("c/other", 300),
        ]);
        let backend = ObjectStoreBackend::new(Arc::new(lister));

        let result = backend
            .latest_savepoint(&location("s3://bucket"))
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("s3://bucket/b/_metadata"));
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let backend = ObjectStoreBackend::new(Arc::new(PagedObjectLister::single_page(vec![])));
        let result = backend
            .latest_savepoint(&location("s3://bucket/prefix"))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_listing_without_markers_is_not_an_error() {
        let lister = PagedObjectLister::single_page(vec![
            object("sp-1/state-0", 100),
            object("sp-1/metadata.json", 200),
        ]);
        let backend = ObjectStoreBackend::new(Arc::new(lister));
        let result = backend
            .latest_savepoint(&location("s3://bucket"))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_all_pages_are_consumed() {
        let lister = Arc::new(PagedObjectLister::new(vec![
            vec![object("sp-1/_metadata", 100), object("sp-1/state", 900)],
            vec![object("sp-2/_metadata", 300)],
            vec![object("sp-3/_metadata", 200)],
        ]));
        let backend = ObjectStoreBackend::new(lister.clone());

        let result = backend
            .latest_savepoint(&location("s3a://bucket/jobs"))
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("s3a://bucket/sp-2/_metadata"));

        let requests = lister.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].continuation_token, None);
        assert_eq!(requests[1].continuation_token.as_deref(), Some("page-1"));
        assert_eq!(requests[2].continuation_token.as_deref(), Some("page-2"));
        assert!(requests
            .iter()
            .all(|r| r.bucket == "bucket" && r.prefix.as_deref() == Some("jobs")));
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_first_marker() {
        let lister = PagedObjectLister::single_page(vec![
            object("first/_metadata", 100),
            object("second/_metadata", 100),
        ]);
        let backend = ObjectStoreBackend::new(Arc::new(lister));
        let result = backend
            .latest_savepoint(&location("s3p://bucket"))
            .await
            .unwrap();
        assert_eq!(result.as_deref(), Some("s3p://bucket/first/_metadata"));
    }

    #[tokio::test]
    async fn test_markers_without_timestamp_are_skipped() {
        let lister = PagedObjectLister::single_page(vec![
            ObjectEntry {
                key: "undated/_metadata".to_string(),
                last_modified: None,
            },
            object("dated/_metadata", 1),
        ]);
        let backend = ObjectStoreBackend::new(Arc::new(lister));
        let result = backend
            .latest_savepoint(&location("s3://bucket"))
            .await
            .unwrap();
        assert_eq!(result.as_deref(), Some("s3://bucket/dated/_metadata"));
    }

    #[tokio::test]
    async fn test_listing_failure_is_propagated() {
        let lister = PagedObjectLister::failing("access denied");
        let backend = ObjectStoreBackend::new(Arc::new(lister));
        let result = backend.latest_savepoint(&location("s3://bucket")).await;
        match result {
            Err(StorageError::ListFailed(msg)) => assert!(msg.contains("access denied")),
            other => panic!("expected ListFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_bucket_is_rejected() {
        let backend = ObjectStoreBackend::new(Arc::new(PagedObjectLister::single_page(vec![])));
        let result = backend.latest_savepoint(&location("s3:///prefix")).await;
        assert!(matches!(result, Err(StorageError::InvalidLocation(_))));
    }

    #[tokio::test]
    async fn test_returned_uri_resolves_back_to_marker_key() {
        let key = "job#1/sp 50%/_metadata";
        let lister = PagedObjectLister::single_page(vec![object(key, 100)]);
        let backend = ObjectStoreBackend::new(Arc::new(lister));

        let uri = backend
            .latest_savepoint(&location("s3://bucket"))
            .await
            .unwrap()
            .unwrap();

        let reparsed = location(&uri);
        assert_eq!(reparsed.bucket, "bucket");
        assert_eq!(reparsed.prefix.as_deref(), Some(key));
    }
}
