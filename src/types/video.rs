use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Processing state of a video resource.
///
/// Encoded as an integer on the wire. Values the service may add later are
/// kept as [`VideoStatus::Other`] instead of failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum VideoStatus {
    #[default]
    Uploading,
    Processing,
    Ready,
    Unavailable,
    Other(i64),
}

impl VideoStatus {
    pub fn code(&self) -> i64 {
        match self {
            VideoStatus::Uploading => 0,
            VideoStatus::Processing => 1,
            VideoStatus::Ready => 2,
            VideoStatus::Unavailable => 3,
            VideoStatus::Other(code) => *code,
        }
    }

    pub fn is_ready(&self) -> bool {
        *self == VideoStatus::Ready
    }
}

impl From<i64> for VideoStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => VideoStatus::Uploading,
            1 => VideoStatus::Processing,
            2 => VideoStatus::Ready,
            3 => VideoStatus::Unavailable,
            other => VideoStatus::Other(other),
        }
    }
}

impl From<VideoStatus> for i64 {
    fn from(status: VideoStatus) -> Self {
        status.code()
    }
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoStatus::Uploading => write!(f, "uploading"),
            VideoStatus::Processing => write!(f, "processing"),
            VideoStatus::Ready => write!(f, "ready"),
            VideoStatus::Unavailable => write!(f, "unavailable"),
            VideoStatus::Other(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Decoded body of every video endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub status: VideoStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub shortcode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url_root: String,
    #[serde(deserialize_with = "null_as_default")]
    pub thumbnail_url: String,
    /// Encoded files keyed by format name ("mp4", "webm", ...)
    #[serde(deserialize_with = "null_as_default")]
    pub files: HashMap<String, VideoFile>,
    /// Available formats in the service's order of preference
    #[serde(deserialize_with = "null_as_default")]
    pub formats: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

impl VideoResponse {
    /// File descriptor for a format, if the service produced one.
    pub fn file(&self, format: &str) -> Option<&VideoFile> {
        self.files.get(format)
    }

    /// First format in the service's preference order that has a file.
    pub fn preferred_file(&self) -> Option<(&str, &VideoFile)> {
        self.formats
            .iter()
            .find_map(|f| self.files.get(f).map(|file| (f.as_str(), file)))
    }
}

/// A single encoded rendition of a video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoFile {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub width: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub height: u32,
}

/// Treat an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
