pub mod auth;
pub mod client;
pub mod progress;
pub mod transport;

pub use auth::apply_auth;
pub use client::{create_client, StreamableClient};
pub use progress::{ProgressCallback, DEFAULT_PROGRESS_INTERVAL};
pub use transport::{decode_video_response, Transport, TransportConfig, API_URL};

use crate::error::StreamableResult;
use crate::types::{Credentials, ProgressInfo, VideoResponse};
use std::path::Path;

// Free functions running against the public API. Each call builds its own
// transport, so its connection pool lives on the caller's runtime.
// Pass `&Credentials::none()` for anonymous requests.

/// Upload a local video file.
pub async fn upload_video(
    credentials: &Credentials,
    path: impl AsRef<Path>,
) -> StreamableResult<VideoResponse> {
    Transport::new()?
        .upload(credentials, path.as_ref())
        .await
}

/// Upload a local video file, reporting progress to `callback`.
pub async fn upload_video_with_progress<F>(
    credentials: &Credentials,
    path: impl AsRef<Path>,
    callback: F,
) -> StreamableResult<VideoResponse>
where
    F: Fn(&ProgressInfo) + Send + Sync + 'static,
{
    Transport::new()?
        .upload_with_progress(credentials, path.as_ref(), callback)
        .await
}

/// Import a video from a remote URL.
pub async fn import_video(
    credentials: &Credentials,
    video_url: &str,
) -> StreamableResult<VideoResponse> {
    Transport::new()?.import(credentials, video_url).await
}

/// Get information about an existing video.
pub async fn get_video(
    credentials: &Credentials,
    shortcode: &str,
) -> StreamableResult<VideoResponse> {
    Transport::new()?.fetch(credentials, shortcode).await
}
