//! Object-store configuration
//!
//! Region, endpoint, and addressing style for the S3 backend. Values are read from
//! the process environment once, then passed explicitly to the backend. Loading a
//! `.env` file is left to the binary. Nothing here is required for filesystem
//! locations.

use std::env;

use crate::traits::{StorageError, StorageResult};

/// Explicit S3 settings, validated before a client is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack, ...).
    pub endpoint_url: Option<String>,
    /// Path-style addressing (`{endpoint}/{bucket}/{key}`). `None` means "on when a
    /// custom endpoint is set".
    pub force_path_style: Option<bool>,
}

impl ObjectStoreConfig {
    pub fn from_env() -> Self {
        let region = non_empty_var("AWS_REGION");
        let endpoint_url =
            non_empty_var("S3_ENDPOINT").or_else(|| non_empty_var("AWS_ENDPOINT_URL"));
        let force_path_style = non_empty_var("S3_FORCE_PATH_STYLE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"));

        ObjectStoreConfig {
            region,
            endpoint_url,
            force_path_style,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// The configured region, or a configuration error if none was provided.
    pub fn region(&self) -> StorageResult<&str> {
        self.region.as_deref().ok_or_else(|| {
            StorageError::ConfigError(
                "AWS_REGION env var must be specified for S3 savepoint directories".to_string(),
            )
        })
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn force_path_style(&self) -> bool {
        self.force_path_style.unwrap_or(self.endpoint_url.is_some())
    }

    pub fn validate(&self) -> StorageResult<()> {
        self.region()?;
        if let Some(endpoint) = self.endpoint_url() {
            url::Url::parse(endpoint).map_err(|e| {
                StorageError::ConnectionError(format!("invalid S3 endpoint {}: {}", endpoint, e))
            })?;
        }
        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_region_is_a_config_error() {
        let config = ObjectStoreConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, StorageError::ConfigError(_)));
        assert!(err.to_string().contains("AWS_REGION"));
    }

    #[test]
    fn region_only_uses_virtual_hosted_style() {
        let config = ObjectStoreConfig::default().with_region("eu-west-1");
        assert!(config.validate().is_ok());
        assert_eq!(config.region().unwrap(), "eu-west-1");
        assert_eq!(config.endpoint_url(), None);
        assert!(!config.force_path_style());
    }

    #[test]
    fn local_endpoint_enables_path_style() {
        let config = ObjectStoreConfig::default()
            .with_region("us-east-1")
            .with_endpoint("http://localhost:9000");
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint_url(), Some("http://localhost:9000"));
        assert!(config.force_path_style());
    }

    #[test]
    fn explicit_path_style_overrides_default() {
        let config = ObjectStoreConfig {
            region: Some("us-east-1".to_string()),
            endpoint_url: Some("https://minio.internal".to_string()),
            force_path_style: Some(false),
        };
        assert!(!config.force_path_style());
    }

    #[test]
    fn malformed_endpoint_is_a_connection_error() {
        let config = ObjectStoreConfig::default()
            .with_region("us-east-1")
            .with_endpoint("not a url");
        assert!(matches!(
            config.validate(),
            Err(StorageError::ConnectionError(_))
        ));
    }

    #[test]
    fn from_env_reads_only_the_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "S3_FORCE_PATH_STYLE=true\n").unwrap();
        let original = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();

        let config = ObjectStoreConfig::from_env();

        env::set_current_dir(original).unwrap();
        assert_eq!(config.force_path_style, None);
        assert!(env::var("S3_FORCE_PATH_STYLE").is_err());
    }
}
