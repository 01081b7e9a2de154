//! HTTP POST sink tests against a local axum server

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use ytspec::sinks::{FailurePolicy, HttpPostSink, ResultSink};
use ytspec_common::output::OutputShape;
use ytspec_common::{ClipResult, Error, NormalizedSample};

/// (content type, body) of each request received
type Captured = Arc<Mutex<Vec<(String, String)>>>;

async fn record(
    State((captured, status)): State<(Captured, StatusCode)>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    captured.lock().unwrap().push((content_type, body));
    (status, "stored")
}

/// Start a server answering every POST with `status`; returns its URL
async fn spawn_server(status: StatusCode) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/spectrogram", post(record))
        .with_state((captured.clone(), status));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/spectrogram", addr), captured)
}

fn clip() -> ClipResult {
    ClipResult::new(
        "abc",
        vec![NormalizedSample::new(0, 0.5), NormalizedSample::new(1, 1.0)],
    )
}

#[tokio::test]
async fn test_posts_structured_json() {
    let (url, captured) = spawn_server(StatusCode::OK).await;
    let sink = HttpPostSink::new(url, OutputShape::Structured).unwrap();

    sink.emit(&clip()).await.unwrap();

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "application/json");
    assert_eq!(
        requests[0].1,
        r#"{"Id":"abc","SampleData":[{"Timestamp":0,"Value":0.5},{"Timestamp":1,"Value":1.0}]}"#
    );
}

#[tokio::test]
async fn test_posts_flat_json() {
    let (url, captured) = spawn_server(StatusCode::CREATED).await;
    let sink = HttpPostSink::new(url, OutputShape::Flat).unwrap();

    sink.emit(&clip()).await.unwrap();

    assert_eq!(captured.lock().unwrap()[0].1, r#"{"0":0.5,"1":1.0}"#);
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let (url, captured) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let sink = HttpPostSink::new(url, OutputShape::Structured).unwrap();

    let result = sink.emit(&clip()).await;

    assert!(matches!(result, Err(Error::Http(ref msg)) if msg.contains("500")));
    assert_eq!(captured.lock().unwrap().len(), 1);
    assert_eq!(sink.failure_policy(), FailurePolicy::BestEffort);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_http_error() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = HttpPostSink::new(format!("http://{}/spectrogram", addr), OutputShape::Flat).unwrap();
    assert!(matches!(sink.emit(&clip()).await, Err(Error::Http(_))));
}

#[tokio::test]
async fn test_truncated_response_body_still_succeeds() {
    // Advertises more body than it sends, then hangs up
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let (mut socket, _) = listener.accept().await.unwrap();
        // Drain the whole request (its flat JSON body ends in '}')
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.ends_with(b"}") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let sink = HttpPostSink::new(format!("http://{}/spectrogram", addr), OutputShape::Flat).unwrap();
    assert!(sink.emit(&clip()).await.is_ok());
}
