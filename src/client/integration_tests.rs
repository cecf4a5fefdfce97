//! HTTP transport integration tests against a mock server

use super::*;
use wiremock::{
    matchers::{header as header_eq, method, path, query_param_is_missing},
    Mock, MockServer, ResponseTemplate,
};

/// Mock HTTP server for controlled testing scenarios
pub struct MockHttpServer {
    server: MockServer,
}

impl MockHttpServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self, request_path: &str) -> String {
        format!("{}{}", self.server.uri(), request_path)
    }

    pub async fn mock_status(&self, request_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_body(&self, request_path: &str, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&self.server)
            .await;
    }

    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

async fn collect(stream: ByteStream) -> Result<Vec<u8>> {
    let chunks: Vec<Bytes> = stream.try_collect().await?;
    Ok(chunks.concat())
}

#[tokio::test]
async fn test_probe_succeeds_on_any_status() {
    let server = MockHttpServer::new().await;
    server.mock_status("/ok", 200).await;
    server.mock_status("/missing", 404).await;

    let transport = ReqwestTransport::new().unwrap();
    assert_eq!(transport.probe(&server.url("/ok")).await.unwrap(), 200);
    assert_eq!(transport.probe(&server.url("/missing")).await.unwrap(), 404);
}

#[tokio::test]
async fn test_probe_fails_on_unreachable_host() {
    let transport = ReqwestTransport::new().unwrap();
    // Port 9 on loopback is the discard service and is closed almost everywhere
    let result = transport.probe("http://127.0.0.1:9/ping").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_stream_returns_full_body() {
    let server = MockHttpServer::new().await;
    let body: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    server.mock_body("/big.bin", body.clone()).await;

    let transport = ReqwestTransport::new().unwrap();
    let stream = transport.stream(&server.url("/big.bin")).await.unwrap();
    assert_eq!(collect(stream).await.unwrap(), body);
}

#[tokio::test]
async fn test_stream_rejects_error_status() {
    let server = MockHttpServer::new().await;
    server.mock_status("/broken", 500).await;

    let transport = ReqwestTransport::new().unwrap();
    let err = match transport.stream(&server.url("/broken")).await {
        Ok(_) => panic!("expected an error for a 500 response"),
        Err(e) => e,
    };
    assert_eq!(err.category(), "HTTP");
}

#[tokio::test]
async fn test_stream_rejects_empty_body() {
    let server = MockHttpServer::new().await;
    server.mock_status("/empty", 204).await;

    let transport = ReqwestTransport::new().unwrap();
    assert!(transport.stream(&server.url("/empty")).await.is_err());
}

#[tokio::test]
async fn test_requests_are_cache_busted() {
    let server = MockHttpServer::new().await;
    server.mock_body("/asset", b"payload".to_vec()).await;

    let transport = ReqwestTransport::new().unwrap();
    transport.probe(&server.url("/asset?cb=stale")).await.unwrap();
    let stream = transport.stream(&server.url("/asset")).await.unwrap();
    collect(stream).await.unwrap();

    let requests = server.received().await;
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let cbs: Vec<String> = request
            .url
            .query_pairs()
            .filter(|(k, _)| k == "cb")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(cbs.len(), 1);
        assert_ne!(cbs[0], "stale");
        assert!(cbs[0].parse::<i64>().is_ok());

        let cache_control = request
            .headers
            .get("cache-control")
            .and_then(|v| v.to_str().ok());
        assert_eq!(cache_control, Some("no-store"));
    }
}

#[tokio::test]
async fn test_uncached_requests_never_match_plain_mock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(query_param_is_missing("cb"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header_eq("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let status = transport.probe(&format!("{}/ping", server.uri())).await.unwrap();
    assert_eq!(status, 200);
}
