pub mod credentials;
pub mod progress;
pub mod video;

pub use credentials::Credentials;
pub use progress::{ProgressInfo, ProgressTracker};
pub use video::{VideoFile, VideoResponse, VideoStatus};
