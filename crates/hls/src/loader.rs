//! Resource acquisition: turning a manifest location into a [`LineSource`].

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::ManifestConfig;
use crate::error::ManifestError;
use crate::source::{BytesSource, FileSource, LineSource};

/// Opens the line source behind a manifest location.
#[async_trait]
pub trait ManifestLoader: Send + Sync {
    async fn open(&self, url: &Url) -> Result<Box<dyn LineSource + Send>, ManifestError>;
}

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &ManifestConfig) -> Result<Client, ManifestError> {
    let mut client_builder = Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    client_builder
        .build()
        .map_err(|e| ManifestError::Client(e.to_string()))
}

/// Loads `http`/`https` manifests over the network and `file` manifests from disk.
#[derive(Debug, Clone)]
pub struct DefaultLoader {
    http_client: Client,
}

impl DefaultLoader {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    pub fn from_config(config: &ManifestConfig) -> Result<Self, ManifestError> {
        Ok(Self::new(create_client(config)?))
    }

    async fn fetch(&self, url: &Url) -> Result<BytesSource, ManifestError> {
        debug!(%url, "Fetching manifest");
        let response = self.http_client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ManifestError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }
        let body = response.bytes().await?;
        debug!(%url, bytes = body.len(), "Fetched manifest");
        Ok(BytesSource::new(url.as_str(), body.to_vec()))
    }

    async fn open_file(&self, url: &Url) -> Result<FileSource, ManifestError> {
        let path = url
            .to_file_path()
            .map_err(|_| ManifestError::InvalidUrl(format!("Not a local file path: {url}")))?;
        debug!(path = %path.display(), "Opening manifest file");
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| ManifestError::io(&path, e))?;
        Ok(FileSource::from_file(path, file.into_std().await))
    }
}

#[async_trait]
impl ManifestLoader for DefaultLoader {
    async fn open(&self, url: &Url) -> Result<Box<dyn LineSource + Send>, ManifestError> {
        match url.scheme() {
            "http" | "https" => Ok(Box::new(self.fetch(url).await?)),
            "file" => Ok(Box::new(self.open_file(url).await?)),
            other => Err(ManifestError::UnsupportedScheme(other.to_string())),
        }
    }
}
