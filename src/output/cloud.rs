//! Upload of finished export files (S3, R2, GCS, Azure, local)

use crate::config::FileFormat;
use crate::error::{Error, Result, ResultExt};
use bytes::Bytes;
use chrono::Utc;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::Path;
use std::sync::Arc;

/// Build a date-partitioned object name for an export
///
/// Format: `{export}/dt={YYYY-MM-DD}/{export}.{ext}`
pub fn export_object_name(export_name: &str, format: FileFormat) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    let sanitized = export_name.replace(['.', '/'], "_");
    let extension = match format {
        FileFormat::Arrow => "arrow",
        FileFormat::Parquet => "parquet",
    };
    format!("{sanitized}/dt={date}/{sanitized}.{extension}")
}

/// Object storage destination parsed from a URL
#[derive(Debug, Clone)]
pub struct CloudDestination {
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    scheme: String,
}

impl CloudDestination {
    /// Parse a destination URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/` or `file:///path/` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::s3(rest, "s3")
        } else if let Some(rest) = url.strip_prefix("r2://") {
            Self::s3(rest, "r2")
        } else if let Some(rest) = url.strip_prefix("gs://") {
            let (bucket, prefix) = split_bucket(rest);
            let store = GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;
            Ok(Self::from_store(Arc::new(store), prefix, "gs"))
        } else if let Some(rest) = url.strip_prefix("az://") {
            let (container, prefix) = split_bucket(rest);
            let store = MicrosoftAzureBuilder::from_env()
                .with_container_name(container)
                .build()
                .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;
            Ok(Self::from_store(Arc::new(store), prefix, "az"))
        } else {
            Self::local(url.strip_prefix("file://").unwrap_or(url))
        }
    }

    /// Wrap an existing object store
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: impl Into<String>, scheme: &str) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            scheme: scheme.to_string(),
        }
    }

    fn s3(rest: &str, scheme: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(rest);
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // AWS_ENDPOINT is read by from_env(); R2 can also be pointed at explicitly
        if scheme == "r2" {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;
        Ok(Self::from_store(Arc::new(store), prefix, scheme))
    }

    fn local(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;
        Ok(Self::from_store(Arc::new(store), String::new(), "file"))
    }

    /// Check if this is a cloud destination (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// Get the scheme (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    fn object_path(&self, name: &str) -> ObjectPath {
        if self.prefix.is_empty() {
            ObjectPath::from(name)
        } else {
            ObjectPath::from(format!("{}/{name}", self.prefix.trim_end_matches('/')))
        }
    }

    /// Write bytes to an object, returning its full location
    pub async fn write(&self, name: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(name);
        self.store.put(&path, data.into()).await?;
        Ok(format!("{}://{path}", self.scheme))
    }

    /// Upload a finished export file
    pub async fn upload_file(&self, local: impl AsRef<Path>, name: &str) -> Result<String> {
        let local = local.as_ref();
        let data = tokio::fs::read(local)
            .await
            .with_context(|| format!("Failed to read export file {}", local.display()))?;
        let location = self.write(name, Bytes::from(data)).await?;
        tracing::info!(file = %local.display(), destination = %location, "Uploaded export file");
        Ok(location)
    }

    /// Read an object back
    pub async fn read(&self, name: &str) -> Result<Bytes> {
        let path = self.object_path(name);
        Ok(self.store.get(&path).await?.bytes().await?)
    }
}

fn split_bucket(rest: &str) -> (&str, String) {
    match rest.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix.to_string()),
        None => (rest, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[test]
    fn test_split_bucket() {
        assert_eq!(split_bucket("bucket/a/b"), ("bucket", "a/b".to_string()));
        assert_eq!(split_bucket("bucket"), ("bucket", String::new()));
    }

    #[test]
    fn test_export_object_name() {
        let name = export_object_name("users.graph", FileFormat::Parquet);
        assert!(name.starts_with("users_graph/dt="));
        assert!(name.ends_with("/users_graph.parquet"));
    }

    #[test]
    fn test_parse_local_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().to_str().unwrap();
        let dest = CloudDestination::parse(path).unwrap();
        assert_eq!(dest.scheme(), "file");
        assert!(!dest.is_cloud());
    }

    #[tokio::test]
    async fn test_upload_and_read_back() {
        let dest = CloudDestination::from_store(Arc::new(InMemory::new()), "exports/", "mem");
        let temp_dir = tempfile::tempdir().unwrap();
        let local = temp_dir.path().join("out.arrow");
        std::fs::write(&local, b"ARROW1").unwrap();

        let location = dest.upload_file(&local, "out.arrow").await.unwrap();
        assert_eq!(location, "mem://exports/out.arrow");
        assert_eq!(dest.read("out.arrow").await.unwrap(), Bytes::from_static(b"ARROW1"));
        assert!(dest.is_cloud());
    }
}
