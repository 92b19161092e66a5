//! Registry client
//!
//! A registry serves each package archive at `{base_url}/<name>@v-<version>`.
//! The HTTP implementation streams the response body straight to disk.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::PackageIdentifier;

/// Default registry base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://pkg.ngpm.dev/packages";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid registry URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to create HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download failed: HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Download from {url} was interrupted")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write archive to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of package archives
#[async_trait]
pub trait Registry: Send + Sync {
    /// Location of the archive for `id`
    fn resource_url(&self, id: &PackageIdentifier) -> String;

    /// Download the archive for `id` into a new file at `dest`
    ///
    /// Returns the number of bytes written. On error `dest` may hold a partial
    /// file; the caller owns cleanup.
    async fn download(&self, id: &PackageIdentifier, dest: &Path) -> Result<u64, RegistryError>;
}

/// Registry reached over HTTP(S)
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let base_url = validate_base_url(base_url)?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("ngpm/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(RegistryError::Client)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Check the base URL and strip any trailing `/`
pub fn validate_base_url(url: &str) -> Result<String, RegistryError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(RegistryError::InvalidUrl {
            url: url.to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }

    reqwest::Url::parse(url).map_err(|e| RegistryError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(url.trim_end_matches('/').to_string())
}

#[async_trait]
impl Registry for HttpRegistry {
    fn resource_url(&self, id: &PackageIdentifier) -> String {
        format!("{}/{}", self.base_url, id.key())
    }

    async fn download(&self, id: &PackageIdentifier, dest: &Path) -> Result<u64, RegistryError> {
        let url = self.resource_url(id);
        tracing::debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let write_err = |source| RegistryError::Write {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(dest).await.map_err(write_err)?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| RegistryError::Body {
                url: url.clone(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;

        tracing::debug!("Received {} bytes from {}", written, url);
        Ok(written)
    }
}
