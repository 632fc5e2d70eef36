use std::path::PathBuf;
use thiserror::Error;

/// A single problem found while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Unified error type for the streamable client.
#[derive(Error, Debug)]
pub enum StreamableError {
    /// Upload path does not exist. Raised before any request is sent.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Local I/O failure while opening or reading the upload file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure from the HTTP layer
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Import or fetch answered with something other than 200
    #[error("not found")]
    NotFound { status: u16 },

    /// Upload answered with something other than 200
    #[error("upload failed")]
    UploadFailed { status: u16 },

    /// Response body was not a valid video response
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation error: {}", .0.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; "))]
    ValidationError(Vec<ValidationIssue>),

    /// Config file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl StreamableError {
    /// HTTP status code, when the error came from a non-200 response.
    pub fn status(&self) -> Option<u16> {
        match self {
            StreamableError::NotFound { status } | StreamableError::UploadFailed { status } => {
                Some(*status)
            }
            StreamableError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for failures detected locally, before or without any network activity.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            StreamableError::FileNotFound(_)
                | StreamableError::Io(_)
                | StreamableError::InvalidUrl(_)
                | StreamableError::InvalidArgument(_)
                | StreamableError::ValidationError(_)
                | StreamableError::Parse(_)
        )
    }
}

impl From<toml::de::Error> for StreamableError {
    fn from(err: toml::de::Error) -> Self {
        StreamableError::Parse(err.to_string())
    }
}

/// Result type alias for operations that can fail with StreamableError.
pub type StreamableResult<T> = Result<T, StreamableError>;
