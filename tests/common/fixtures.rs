//! Response payloads and upload files used across integration tests.

use std::io::Write;
use tempfile::NamedTempFile;

/// Payload returned for the `ifjh` sample video.
pub fn ifjh_video_json() -> serde_json::Value {
    serde_json::json!({
        "status": 2,
        "shortcode": "ifjh",
        "url": "streamable.com/ifjh",
        "thumbnail_url": "//cdn.example.com/image/ifjh.jpg",
        "files": {
            "mp4": {
                "url": "//cdn.example.com/video/mp4/ifjh.mp4",
                "width": 848,
                "height": 480
            }
        },
        "formats": ["mp4", "webm"],
        "message": null
    })
}

/// Payload the service returns right after accepting an upload or import.
pub fn queued_video_json(shortcode: &str) -> serde_json::Value {
    serde_json::json!({
        "status": 1,
        "shortcode": shortcode
    })
}

/// Temporary `.mp4` file holding `size` bytes of filler data.
pub fn video_file(size: usize) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("cat-video")
        .suffix(".mp4")
        .tempfile()
        .unwrap();
    let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    file.write_all(&data).unwrap();
    file.flush().unwrap();
    file
}
