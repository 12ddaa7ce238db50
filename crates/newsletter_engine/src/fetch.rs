use std::path::Path;

use engine_logging::engine_trace;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::settings::FetchSettings;
use crate::types::{FailureKind, FetchError};

/// Downloads a resource straight to a file.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Writes the body of `url` to `destination`, replacing any existing
    /// file, and returns the number of bytes written.
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = settings.user_agent.as_deref() {
            builder = builder.user_agent(agent);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(map_io_error)?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            file.write_all(&chunk).await.map_err(map_io_error)?;
            written += chunk.len() as u64;
            engine_trace!("{url}: {written} bytes so far");
        }
        file.flush().await.map_err(map_io_error)?;
        engine_trace!("{url}: saved to {}", destination.display());

        Ok(written)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn map_io_error(err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}
