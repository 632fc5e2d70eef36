//! Client for the streamable.com video hosting API.
//!
//! Three operations are supported: uploading a local file, importing a video
//! from a remote URL and fetching metadata for an existing video. They are
//! available as free functions taking [`Credentials`] and as methods on
//! [`StreamableClient`], which stores the credentials once.

pub mod api;
pub mod config;
pub mod error;
pub mod types;

pub use api::{
    create_client, get_video, import_video, upload_video, upload_video_with_progress,
    StreamableClient, Transport, TransportConfig, API_URL,
};
pub use config::{CliArgs, Config};
pub use error::{StreamableError, StreamableResult};
pub use types::{Credentials, ProgressInfo, VideoFile, VideoResponse, VideoStatus};
