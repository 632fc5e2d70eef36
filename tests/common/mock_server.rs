//! WireMock server utilities for API testing

use super::fixtures::{ifjh_video_json, queued_video_json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock server serving the `ifjh` video and accepting uploads and imports.
pub async fn setup_mock_server() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/ifjh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ifjh_video_json()))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(queued_video_json("upl0")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/import"))
        .respond_with(ResponseTemplate::new(200).set_body_json(queued_video_json("imp0")))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Mock server answering every endpoint with `status_code` and `body`.
pub async fn setup_mock_server_with_error(status_code: u16, body: &str) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
        .mount(&mock_server)
        .await;

    mock_server
}

/// `Authorization` header of every request the server received, in order.
pub async fn authorization_headers(mock_server: &MockServer) -> Vec<Option<String>> {
    mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .map(|v| v.to_str().unwrap().to_string())
        })
        .collect()
}
