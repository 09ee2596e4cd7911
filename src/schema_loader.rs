//! Schema retrieval
//!
//! Loads the external XSD used for output validation: disk cache first, then the
//! published URL. Every failure mode short of a corrupt cache degrades to "no
//! schema", which selects the reduced structural check downstream; conversion
//! never fails because the schema host is unreachable.

use std::path::Path;

use crate::cache::DiskCache;
use crate::error::{ConvertError, Result};
use crate::http_client::AsyncHttpClient;
use crate::markup::XSD_SCHEMA_LOCATION;

/// Loads and caches the validation schema.
pub struct SchemaLoader {
    cache: DiskCache,
    http_client: AsyncHttpClient,
    offline: bool,
}

impl SchemaLoader {
    pub fn new(cache: DiskCache, http_client: AsyncHttpClient, offline: bool) -> Self {
        Self {
            cache,
            http_client,
            offline,
        }
    }

    /// Fetch the schema bytes, or `None` when they cannot be obtained.
    ///
    /// In offline mode only the cache is consulted. A download failure is
    /// reported through the returned diagnostic, never as an error.
    pub async fn load(&self) -> (Option<Vec<u8>>, Option<String>) {
        match self.cache.get(XSD_SCHEMA_LOCATION).await {
            Ok(Some(cached)) => return (Some(cached.data), None),
            Ok(None) => {}
            Err(e) => return (None, Some(format!("schema cache read failed: {e}"))),
        }

        if self.offline {
            return (
                None,
                Some("offline mode and no cached schema; full validation skipped".to_string()),
            );
        }

        match self.download().await {
            Ok(data) => (Some(data), None),
            Err(e) => (None, Some(format!("schema download failed: {e}"))),
        }
    }

    async fn download(&self) -> Result<Vec<u8>> {
        let data = self
            .http_client
            .download_schema(XSD_SCHEMA_LOCATION)
            .await?;
        validate_schema_content(&data, XSD_SCHEMA_LOCATION)?;

        // A failed cache write only costs the next run a download.
        let _ = self.cache.set(XSD_SCHEMA_LOCATION, &data).await;
        Ok(data)
    }

    /// Load schema bytes from a local file instead of the published URL.
    pub async fn load_local(&self, path: &Path) -> Result<Vec<u8>> {
        let data = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::SchemaNotFound {
                url: path.display().to_string(),
            },
            _ => ConvertError::Io(e),
        })?;
        validate_schema_content(&data, &path.display().to_string())?;
        Ok(data)
    }
}

/// Sanity-check that the bytes look like an XML Schema before caching them.
fn validate_schema_content(data: &[u8], source: &str) -> Result<()> {
    let content = std::str::from_utf8(data).map_err(|_| {
        ConvertError::Cache(format!("schema from {source} is not valid UTF-8"))
    })?;

    let trimmed = content.trim_start();
    if !trimmed.starts_with("<?xml") && !trimmed.starts_with('<') {
        return Err(ConvertError::Cache(format!(
            "content from {source} does not appear to be XML"
        )));
    }

    if !content.contains("<xs:schema")
        && !content.contains("<xsd:schema")
        && !content.contains("<schema")
    {
        return Err(ConvertError::Cache(format!(
            "content from {source} does not appear to be an XML Schema (XSD)"
        )));
    }

    Ok(())
}
