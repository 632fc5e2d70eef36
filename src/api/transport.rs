use crate::api::auth::apply_auth;
use crate::api::progress::{ProgressCallback, ProgressSession, DEFAULT_PROGRESS_INTERVAL};
use crate::error::{StreamableError, StreamableResult};
use crate::types::{Credentials, ProgressInfo, VideoResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, StatusCode, Url};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, trace, warn};

/// Base URL of the public streamable API
pub const API_URL: &str = "https://api.streamable.com";

const UPLOAD_PATH: &str = "upload";
const IMPORT_PATH: &str = "import";
const VIDEOS_PATH: &str = "videos";

/// Multipart field carrying the uploaded file
const UPLOAD_FIELD: &str = "file";
const IMPORT_QUERY_PARAM: &str = "url";

/// Settings for building a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    /// Whole-request timeout. `None` keeps reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    pub progress_interval: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: API_URL.to_string(),
            timeout: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Builds, sends and decodes the requests of the streamable API.
///
/// Cloning is cheap and clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
    progress_interval: Duration,
}

impl Transport {
    /// Transport pointed at [`API_URL`] with default settings
    pub fn new() -> StreamableResult<Self> {
        Self::with_config(TransportConfig::default())
    }

    pub fn with_base_url(base_url: &str) -> StreamableResult<Self> {
        Self::with_config(TransportConfig {
            base_url: base_url.to_string(),
            ..TransportConfig::default()
        })
    }

    pub fn with_config(config: TransportConfig) -> StreamableResult<Self> {
        // Validate URL at construction time
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StreamableError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StreamableError::InvalidUrl(format!(
                "{}: cannot be used as a base URL",
                config.base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url,
            progress_interval: config.progress_interval,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn progress_interval(&self) -> Duration {
        self.progress_interval
    }

    fn endpoint(&self, segments: &[&str]) -> StreamableResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StreamableError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn upload_url(&self) -> StreamableResult<Url> {
        self.endpoint(&[UPLOAD_PATH])
    }

    pub fn import_url(&self, video_url: &str) -> StreamableResult<Url> {
        let mut url = self.endpoint(&[IMPORT_PATH])?;
        url.query_pairs_mut()
            .append_pair(IMPORT_QUERY_PARAM, video_url);
        Ok(url)
    }

    pub fn video_url(&self, shortcode: &str) -> StreamableResult<Url> {
        self.endpoint(&[VIDEOS_PATH, shortcode])
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Upload a local video file.
    #[instrument(
        skip(self, credentials),
        fields(api_op = "upload", path = %path.display(), authenticated = credentials.is_authenticated())
    )]
    pub async fn upload(
        &self,
        credentials: &Credentials,
        path: &Path,
    ) -> StreamableResult<VideoResponse> {
        self.upload_inner(credentials, path, None).await
    }

    /// Upload a local video file, reporting progress to `callback` on an interval.
    #[instrument(
        skip(self, credentials, callback),
        fields(api_op = "upload_with_progress", path = %path.display(), authenticated = credentials.is_authenticated())
    )]
    pub async fn upload_with_progress<F>(
        &self,
        credentials: &Credentials,
        path: &Path,
        callback: F,
    ) -> StreamableResult<VideoResponse>
    where
        F: Fn(&ProgressInfo) + Send + Sync + 'static,
    {
        let callback: ProgressCallback = Arc::new(callback);
        self.upload_inner(credentials, path, Some(callback)).await
    }

    async fn upload_inner(
        &self,
        credentials: &Credentials,
        path: &Path,
        callback: Option<ProgressCallback>,
    ) -> StreamableResult<VideoResponse> {
        let (file, total_bytes) = open_upload_file(path).await?;

        let url = self.upload_url()?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UPLOAD_FIELD.to_string());

        let (body, progress) = match callback {
            Some(callback) => {
                let session = ProgressSession::new(total_bytes);
                let stream = session.tracked_stream(file);
                (Body::wrap_stream(stream), Some((session, callback)))
            }
            None => (Body::wrap_stream(ReaderStream::new(file)), None),
        };

        let part = Part::stream_with_length(body, total_bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        let request = apply_auth(self.client.post(url).multipart(form), credentials);

        trace!(api_op = "upload", total_bytes, "Sending upload request");

        // Nothing may return early between starting and finishing the poller
        let poller = progress
            .map(|(session, callback)| session.start(callback, self.progress_interval));
        let sent = request.send().await;
        if let Some(poller) = poller {
            poller.finish().await;
        }
        let response = sent?;

        let video = read_video_response(response, |status| {
            StreamableError::UploadFailed { status }
        })
        .await?;
        debug!(api_op = "upload", status = %video.status, "Upload accepted");
        Ok(video)
    }

    /// Ask the service to fetch and transcode a remote video.
    #[instrument(
        skip(self, credentials),
        fields(api_op = "import", authenticated = credentials.is_authenticated())
    )]
    pub async fn import(
        &self,
        credentials: &Credentials,
        video_url: &str,
    ) -> StreamableResult<VideoResponse> {
        let url = self.import_url(video_url)?;

        trace!(api_op = "import", url = %url);

        let response = apply_auth(self.client.get(url), credentials).send().await?;
        let video =
            read_video_response(response, |status| StreamableError::NotFound { status }).await?;
        debug!(api_op = "import", status = %video.status, shortcode = %video.shortcode);
        Ok(video)
    }

    /// Fetch metadata of an existing video.
    ///
    /// The returned `shortcode` is always the one requested.
    #[instrument(
        skip(self, credentials),
        fields(api_op = "fetch", authenticated = credentials.is_authenticated())
    )]
    pub async fn fetch(
        &self,
        credentials: &Credentials,
        shortcode: &str,
    ) -> StreamableResult<VideoResponse> {
        let url = self.video_url(shortcode)?;

        trace!(api_op = "fetch", url = %url);

        let response = apply_auth(self.client.get(url), credentials).send().await?;
        let mut video =
            read_video_response(response, |status| StreamableError::NotFound { status }).await?;
        video.shortcode = shortcode.to_string();
        debug!(api_op = "fetch", status = %video.status);
        Ok(video)
    }
}

/// Open the file to upload and take its length from the opened handle.
async fn open_upload_file(path: &Path) -> StreamableResult<(tokio::fs::File, u64)> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(api_op = "upload", "Upload file does not exist");
            return Err(StreamableError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let total_bytes = file.metadata().await?.len();
    Ok((file, total_bytes))
}

/// Check for a 200 and decode the body, without ever echoing an error body.
async fn read_video_response(
    response: Response,
    on_status: impl FnOnce(u16) -> StreamableError,
) -> StreamableResult<VideoResponse> {
    let status = response.status();
    if status != StatusCode::OK {
        warn!(status = status.as_u16(), "Unexpected response status");
        return Err(on_status(status.as_u16()));
    }

    let body = response.bytes().await?;
    trace!(body_len = body.len(), "Decoding response body");
    decode_video_response(&body)
}

/// Parse a response body into a [`VideoResponse`].
pub fn decode_video_response(body: &[u8]) -> StreamableResult<VideoResponse> {
    Ok(serde_json::from_slice(body)?)
}
