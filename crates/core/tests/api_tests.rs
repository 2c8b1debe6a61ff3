//! Library API integration tests
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use perspective_core::*;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

const ANALYZE_PATH: &str = "/v1alpha1/comments:analyze";

fn default_response() -> Value {
    json!({
        "attributeScores": {
            "TOXICITY": {
                "spanScores": [
                    {"begin": 0, "end": 56, "score": {"value": 0.8728314, "type": "PROBABILITY"}}
                ],
                "summaryScore": {"value": 0.8728314, "type": "PROBABILITY"}
            }
        },
        "languages": ["en"]
    })
}

/// Reads one HTTP/1.1 request (headers plus Content-Length body) from the socket.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Serves a single canned response and returns the raw request it received.
async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}{}", listener.local_addr().unwrap(), ANALYZE_PATH);

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (endpoint, handle)
}

fn client_for(endpoint: &str) -> Perspective {
    let config = ClientConfig::builder().api_key("test-key").endpoint(endpoint).timeout(5).build();
    Perspective::new(config).expect("client should build")
}

#[test]
fn test_requires_api_key() {
    assert!(matches!(
        Perspective::new(ClientConfig::default()),
        Err(PerspectiveError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_analyze_over_http() {
    let (endpoint, server) = serve_once("200 OK", default_response().to_string()).await;
    let client = client_for(&endpoint);

    let response = client.analyze_text("testing is for dummies").await.unwrap();
    assert_eq!(response.as_value(), &default_response());
    assert_eq!(response.summary_score("TOXICITY"), Some(0.8728314));

    let request = server.await.unwrap();
    assert!(request.starts_with(&format!("POST {}?key=test-key HTTP/1.1", ANALYZE_PATH)));

    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let sent: Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        sent,
        json!({
            "comment": {"text": "testing is for dummies"},
            "requestedAttributes": {"TOXICITY": {}},
            "doNotStore": true
        })
    );
}

#[tokio::test]
async fn test_error_status_over_http() {
    let (endpoint, server) = serve_once("400 Bad Request", json!({"error": {"message": "invalid!"}}).to_string()).await;
    let client = client_for(&endpoint);

    let err = client.analyze_text("testing is for dummies").await.unwrap_err();
    server.await.unwrap();

    match err {
        PerspectiveError::Response(err) => {
            assert_eq!(err.message(), "invalid!");
            assert_eq!(err.status(), Some(400));
            assert_eq!(err.body(), Some(&json!({"error": {"message": "invalid!"}})));
        }
        other => panic!("expected ResponseError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}{}", listener.local_addr().unwrap(), ANALYZE_PATH);
    drop(listener);

    let err = client_for(&endpoint).analyze_text("hello").await.unwrap_err();
    assert!(!err.to_string().contains("test-key"), "API key leaked: {}", err);
    assert!(!format!("{:?}", err).contains("test-key"));

    match err {
        PerspectiveError::Response(err) => {
            assert_eq!(err.status(), None);
            assert!(err.body().is_none());
            assert!(!err.message().contains("test-key"));
        }
        other => panic!("expected ResponseError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_truncated_body_keeps_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}{}", listener.local_addr().unwrap(), ANALYZE_PATH);
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let head = "HTTP/1.1 503 Service Unavailable\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(br#"{"error":"#).await.unwrap();
        let _ = socket.shutdown().await;
    });

    let err = client_for(&endpoint).analyze_text("hello").await.unwrap_err();
    server.await.unwrap();

    assert!(!err.to_string().contains("test-key"));
    match err {
        PerspectiveError::Response(err) => {
            assert_eq!(err.status(), Some(503));
            assert!(err.body().is_none());
        }
        other => panic!("expected ResponseError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_is_response_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}{}", listener.local_addr().unwrap(), ANALYZE_PATH);
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let config = ClientConfig::builder().api_key("test-key").endpoint(&endpoint).timeout(1).build();
    let err = Perspective::new(config).unwrap().analyze_text("hello").await.unwrap_err();
    server.abort();

    match err {
        PerspectiveError::Response(err) => {
            assert_eq!(err.status(), None);
            assert!(err.message().contains("timed out"));
            assert!(!err.message().contains("test-key"));
        }
        other => panic!("expected ResponseError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_validation_fails_before_connecting() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}{}", listener.local_addr().unwrap(), ANALYZE_PATH);
    let client = client_for(&endpoint);

    let err = client.analyze("<p></p>", &AnalyzeOptions::default()).await.unwrap_err();
    assert!(matches!(err, PerspectiveError::TextEmpty));
    assert!(err.is_validation());
    assert!(!client.transport().is_initialized());

    let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err(), "no connection should have been made");
}

/// Echoes the request's client token back, counting calls.
struct EchoTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for EchoTransport {
    async fn post_json(&self, _url: &Url, _api_key: &str, body: &Value) -> Result<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let reply = json!({"clientToken": body["clientToken"], "echo": body["comment"]["text"]});
        Ok(TransportResponse { status: 200, body: reply.to_string() })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_are_independent() {
    let transport = EchoTransport { calls: AtomicUsize::new(0) };
    let config = ClientConfig::builder().api_key("mock-key").build();
    let client = Arc::new(Perspective::with_transport(config, transport).unwrap());

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                let request = AnalysisRequest {
                    comment: Some(Comment::new(format!("<i>comment {}</i>", i))),
                    client_token: Some(format!("token-{}", i)),
                    ..Default::default()
                };
                (i, client.analyze(request, &AnalyzeOptions::default()).await.unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (i, response) = handle.await.unwrap();
        assert_eq!(response.client_token(), Some(format!("token-{}", i).as_str()));
        assert_eq!(response.as_value()["echo"], format!("comment {}", i));
    }
    assert_eq!(client.transport().calls.load(Ordering::SeqCst), 20);
}

#[test]
fn test_attributes_as_list() {
    let options = AnalyzeOptions::builder().attributes(["unsubstantial", "spam"]).build();
    let request = build_request("jolly good tests", &options).unwrap();
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["requestedAttributes"], json!({"SPAM": {}, "UNSUBSTANTIAL": {}}));
    assert!(json["requestedAttributes"].get("TOXICITY").is_none());
}

#[test]
fn test_request_object_passthrough() {
    let value = json!({
        "comment": {"text": "hooray for tests"},
        "requestedAttributes": {"UNSUBSTANTIAL": {}, "SPAM": {}},
        "clientToken": "test",
        "doNotStore": true
    });
    let request = build_request(AnalysisInput::from_json(value.clone()).unwrap(), &AnalyzeOptions::default()).unwrap();
    assert_eq!(serde_json::to_value(&request).unwrap(), value);
}

#[test]
fn test_truncate_option() {
    let text = "x".repeat(3001);

    assert!(matches!(
        build_request(text.as_str(), &AnalyzeOptions::default()),
        Err(PerspectiveError::TextTooLong { length: 3001, max: 3000 })
    ));

    let truncated = build_request(text.as_str(), &AnalyzeOptions::builder().truncate(true).build()).unwrap();
    assert_eq!(truncated.text(), Some("x".repeat(3000).as_str()));
}

#[test]
fn test_stripped_text_equals_strip_html() {
    for text in ["plain", "<p>para</p>", "a <b>bold</b> move", "1 < 2 > 0"] {
        let request = build_request(text, &AnalyzeOptions::default()).unwrap();
        assert_eq!(request.text(), Some(strip_html(text).as_str()));
    }
}
