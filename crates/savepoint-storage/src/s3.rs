use crate::config::ObjectStoreConfig;
use crate::traits::{ObjectEntry, ObjectLister, ObjectPage, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use chrono::DateTime;

/// `ListObjectsV2` client for S3 and S3-compatible stores
#[derive(Clone)]
pub struct S3Lister {
    client: Client,
}

impl S3Lister {
    /// Build a client from explicit settings.
    ///
    /// Fails with `ConfigError` when no region is configured and with
    /// `ConnectionError` when the custom endpoint is not a valid URL. Credentials
    /// are resolved by the SDK default provider chain.
    pub async fn connect(config: &ObjectStoreConfig) -> StorageResult<Self> {
        config.validate()?;
        let region = config.region()?.to_string();

        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style());
        if let Some(endpoint) = config.endpoint_url() {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }
        let client = Client::from_conf(s3_config_builder.build());

        tracing::debug!(
            region = %region,
            endpoint = ?config.endpoint_url(),
            path_style = config.force_path_style(),
            "S3 client created"
        );

        Ok(S3Lister { client })
    }
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> StorageResult<ObjectPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_string))
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(
                    error = %DisplayErrorContext(&e),
                    bucket = %bucket,
                    prefix = ?prefix,
                    "S3 list failed"
                );
                StorageError::ListFailed(DisplayErrorContext(&e).to_string())
            })?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ObjectEntry {
                    key: key.to_string(),
                    last_modified: object
                        .last_modified()
                        .and_then(|lm| DateTime::from_timestamp(lm.secs(), lm.subsec_nanos())),
                })
            })
            .collect();

        Ok(ObjectPage {
            objects,
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_without_region_fails_fast() {
        let result = S3Lister::connect(&ObjectStoreConfig::default()).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
