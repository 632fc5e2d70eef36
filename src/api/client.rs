use crate::api::transport::{Transport, TransportConfig};
use crate::config::ApiConfig;
use crate::error::StreamableResult;
use crate::types::{Credentials, ProgressInfo, VideoResponse};
use std::path::Path;
use std::time::Duration;

/// Streamable API client holding the credentials used for every call.
#[derive(Debug, Clone)]
pub struct StreamableClient {
    transport: Transport,
    credentials: Credentials,
}

impl StreamableClient {
    /// Create an anonymous client for the public API
    pub fn new() -> StreamableResult<Self> {
        Ok(Self::with_transport(Transport::new()?))
    }

    /// Create an anonymous client against a different base URL
    pub fn with_base_url(base_url: &str) -> StreamableResult<Self> {
        Ok(Self::with_transport(Transport::with_base_url(base_url)?))
    }

    pub fn with_transport(transport: Transport) -> Self {
        Self {
            transport,
            credentials: Credentials::none(),
        }
    }

    /// Replace the stored credentials. Returns `self` for chaining.
    pub fn set_credentials(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> &mut Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Upload a local video file.
    pub async fn upload_video(&self, path: impl AsRef<Path>) -> StreamableResult<VideoResponse> {
        self.transport
            .upload(&self.credentials, path.as_ref())
            .await
    }

    /// Same as [`upload_video`](Self::upload_video), periodically calling
    /// `callback` with the upload progress.
    pub async fn upload_video_with_progress<F>(
        &self,
        path: impl AsRef<Path>,
        callback: F,
    ) -> StreamableResult<VideoResponse>
    where
        F: Fn(&ProgressInfo) + Send + Sync + 'static,
    {
        self.transport
            .upload_with_progress(&self.credentials, path.as_ref(), callback)
            .await
    }

    /// Import a video from a remote URL.
    pub async fn import_video(&self, video_url: &str) -> StreamableResult<VideoResponse> {
        self.transport.import(&self.credentials, video_url).await
    }

    /// Get information about the video with the given shortcode.
    pub async fn get_video(&self, shortcode: &str) -> StreamableResult<VideoResponse> {
        self.transport.fetch(&self.credentials, shortcode).await
    }
}

/// Helper function to create a StreamableClient from configuration
///
/// Credentials are only attached when both username and password are
/// configured.
pub fn create_client(api_config: &ApiConfig) -> StreamableResult<StreamableClient> {
    let transport = Transport::with_config(TransportConfig {
        base_url: api_config.url.clone(),
        timeout: api_config.timeout_secs.map(Duration::from_secs),
        progress_interval: Duration::from_millis(api_config.progress_interval_ms),
    })?;

    Ok(StreamableClient::with_transport(transport).with_credentials(api_config.credentials()))
}
