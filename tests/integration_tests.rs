//! End-to-end tests of the client against a stub server.

mod common;

use common::fixtures::{ifjh_video_json, video_file};
use common::mock_server::{authorization_headers, setup_mock_server, setup_mock_server_with_error};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use streamable::{
    Credentials, ProgressInfo, StreamableClient, StreamableError, Transport, TransportConfig,
    VideoResponse, VideoStatus,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_video_ifjh() {
    let mock_server = setup_mock_server().await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();

    let video = client.get_video("ifjh").await.unwrap();

    assert_eq!(video.status, VideoStatus::Ready);
    assert_eq!(video.shortcode, "ifjh");
    assert_eq!(video.url, "streamable.com/ifjh");
    assert_eq!(video.thumbnail_url, "//cdn.example.com/image/ifjh.jpg");
    assert_eq!(video.files["mp4"].width, 848);
    assert_eq!(video.files["mp4"].height, 480);
    assert_eq!(video.formats, vec!["mp4", "webm"]);
    assert_eq!(video.message, "");
}

#[tokio::test]
async fn test_get_video_shortcode_comes_from_caller() {
    let mock_server = MockServer::start().await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();

    // Server payload disagrees with the requested shortcode
    Mock::given(method("GET"))
        .and(path("/videos/abcd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ifjh_video_json()))
        .mount(&mock_server)
        .await;

    let video = client.get_video("abcd").await.unwrap();
    assert_eq!(video.shortcode, "abcd");
}

#[tokio::test]
async fn test_anonymous_requests_carry_no_auth() {
    let mock_server = setup_mock_server().await;
    let mut client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();
    let file = video_file(1024);

    client.get_video("ifjh").await.unwrap();
    client.set_credentials("user", "");
    client.import_video("https://example.com/cat.mp4").await.unwrap();
    client.set_credentials("", "pass");
    client.upload_video(file.path()).await.unwrap();

    let headers = authorization_headers(&mock_server).await;
    assert_eq!(headers.len(), 3);
    assert!(headers.iter().all(|h| h.is_none()));
}

#[tokio::test]
async fn test_authenticated_requests_carry_basic_auth() {
    let mock_server = setup_mock_server().await;
    let mut client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();
    client.set_credentials("user", "pass");
    let file = video_file(16);

    client.get_video("ifjh").await.unwrap();
    client.import_video("https://example.com/cat.mp4").await.unwrap();
    client.upload_video(file.path()).await.unwrap();

    let headers = authorization_headers(&mock_server).await;
    assert_eq!(headers.len(), 3);
    for header in headers {
        assert_eq!(header.as_deref(), Some("Basic dXNlcjpwYXNz"));
    }
}

#[tokio::test]
async fn test_import_video_passes_encoded_url() {
    let mock_server = MockServer::start().await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();
    let remote = "https://archive.org/download/Wildlife Sample/Wildlife.wmv?a=1&b=2";

    Mock::given(method("GET"))
        .and(path("/import"))
        .and(query_param("url", remote))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 1, "shortcode": "wild"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let video = client.import_video(remote).await.unwrap();
    assert_eq!(video.status, VideoStatus::Processing);
    assert_eq!(video.shortcode, "wild");
}

#[tokio::test]
async fn test_upload_video_success() {
    let mock_server = setup_mock_server().await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();
    let file = video_file(64 * 1024);

    let video = client.upload_video(file.path()).await.unwrap();
    assert_eq!(video.shortcode, "upl0");
    assert_ne!(video, VideoResponse::default());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    let contents = std::fs::read(file.path()).unwrap();
    assert!(body
        .windows(contents.len())
        .any(|window| window == contents.as_slice()));
}

#[tokio::test]
async fn test_upload_video_non_200_is_upload_failed() {
    let mock_server = setup_mock_server_with_error(500, "internal details").await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();
    let file = video_file(128);

    let err = client.upload_video(file.path()).await.unwrap_err();
    assert!(matches!(err, StreamableError::UploadFailed { status: 500 }));
    assert_eq!(err.to_string(), "upload failed");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_upload_video_missing_file() {
    let mock_server = setup_mock_server().await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .upload_video(dir.path().join("not-exists.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, StreamableError::FileNotFound(_)));
    assert!(err.is_client_side());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_200_maps_to_not_found() {
    let mock_server = setup_mock_server_with_error(403, "forbidden").await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();

    let err = client.get_video("ifjh").await.unwrap_err();
    assert!(matches!(err, StreamableError::NotFound { status: 403 }));

    let err = client.import_video("https://example.com/x.mp4").await.unwrap_err();
    assert!(matches!(err, StreamableError::NotFound { status: 403 }));
    assert_eq!(err.to_string(), "not found");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();

    Mock::given(method("GET"))
        .and(path("/videos/ifjh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ready"})),
        )
        .mount(&mock_server)
        .await;

    let err = client.get_video("ifjh").await.unwrap_err();
    assert!(matches!(err, StreamableError::Decode(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_connection_failure_is_http_error() {
    // Grab a free port, then close it so nothing listens there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = StreamableClient::with_base_url(&format!("http://127.0.0.1:{}", port)).unwrap();

    let err = client.get_video("ifjh").await.unwrap_err();
    assert!(matches!(err, StreamableError::Http(_)));
    assert!(!err.is_client_side());
}

#[tokio::test]
async fn test_timeout_is_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ifjh_video_json())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let transport = Transport::with_config(TransportConfig {
        base_url: mock_server.uri(),
        timeout: Some(Duration::from_millis(100)),
        ..TransportConfig::default()
    })
    .unwrap();
    let client = StreamableClient::with_transport(transport);

    match client.get_video("slow").await {
        Err(StreamableError::Http(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_with_progress_reports_completion() {
    let mock_server = setup_mock_server().await;
    let transport = Transport::with_config(TransportConfig {
        base_url: mock_server.uri(),
        progress_interval: Duration::from_millis(2),
        ..TransportConfig::default()
    })
    .unwrap();
    let client = StreamableClient::with_transport(transport)
        .with_credentials(Credentials::new("user", "pass"));
    let size = 512 * 1024;
    let file = video_file(size);

    let seen = Arc::new(Mutex::new(Vec::<ProgressInfo>::new()));
    let sink = Arc::clone(&seen);
    let video = client
        .upload_video_with_progress(file.path(), move |info| {
            sink.lock().unwrap().push(*info);
        })
        .await
        .unwrap();
    assert_eq!(video.shortcode, "upl0");

    let count_at_return = {
        let seen = seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.uploaded_bytes, size as u64);
        assert_eq!(last.remaining_bytes(), 0);
        assert!((last.fraction() - 1.0).abs() < f64::EPSILON);
        seen.len()
    };

    // Polling stopped with the upload
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(seen.lock().unwrap().len(), count_at_return);
}

#[tokio::test]
async fn test_upload_with_progress_stops_on_failure() {
    let mock_server = setup_mock_server_with_error(500, "").await;
    let transport = Transport::with_config(TransportConfig {
        base_url: mock_server.uri(),
        progress_interval: Duration::from_millis(1),
        ..TransportConfig::default()
    })
    .unwrap();
    let client = StreamableClient::with_transport(transport);
    let file = video_file(4096);

    let seen = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&seen);
    let err = client
        .upload_video_with_progress(file.path(), move |_| {
            *sink.lock().unwrap() += 1;
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StreamableError::UploadFailed { .. }));

    let count = *seen.lock().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*seen.lock().unwrap(), count);
}

#[tokio::test]
async fn test_upload_with_progress_connection_failure_makes_no_late_calls() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = Transport::with_config(TransportConfig {
        base_url: format!("http://{}", addr),
        progress_interval: Duration::from_millis(1),
        ..TransportConfig::default()
    })
    .unwrap();
    let client = StreamableClient::with_transport(transport);
    let file = video_file(4096);

    let seen = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&seen);
    let err = client
        .upload_video_with_progress(file.path(), move |_| {
            *sink.lock().unwrap() += 1;
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StreamableError::Http(_)));

    let count = *seen.lock().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*seen.lock().unwrap(), count);
}

#[tokio::test]
async fn test_slow_progress_callback_keeps_upload_fast() {
    let mock_server = setup_mock_server().await;
    let transport = Transport::with_config(TransportConfig {
        base_url: mock_server.uri(),
        progress_interval: Duration::from_millis(1),
        ..TransportConfig::default()
    })
    .unwrap();
    let client = StreamableClient::with_transport(transport);
    let file = video_file(2 * 1024 * 1024);

    let calls = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&calls);
    let started = std::time::Instant::now();
    let video = client
        .upload_video_with_progress(file.path(), move |_| {
            std::thread::sleep(Duration::from_millis(100));
            *sink.lock().unwrap() += 1;
        })
        .await
        .unwrap();

    assert_eq!(video.shortcode, "upl0");
    assert!(*calls.lock().unwrap() >= 1);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let mock_server = setup_mock_server().await;
    let client = StreamableClient::with_base_url(&mock_server.uri()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_video("ifjh").await })
        })
        .collect();

    for handle in handles {
        let video = handle.await.unwrap().unwrap();
        assert_eq!(video.shortcode, "ifjh");
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 8);
}
