//! Integration tests for the server: a real socket, a hyper client, and a
//! `RenameKey` chain in front of an echoing upstream.

use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::{self, SendRequest};
use hyper_util::rt::TokioIo;
use rekey::middleware::RenameKey;
use rekey::{Config, Request, Response, Server};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

// =============================================================================
// Harness
// =============================================================================

async fn echo(mut req: Request) -> Response {
    match req.take_body() {
        Some(body) => match body.collect().await {
            Ok(bytes) => Response::json(bytes),
            Err(_) => Response::status(StatusCode::BAD_REQUEST),
        },
        None => Response::status(StatusCode::NO_CONTENT),
    }
}

/// Starts a server on a free local port and returns its address.
fn start() -> (String, JoinHandle<Result<(), rekey::Error>>) {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("free port")
        .port();
    let addr = format!("127.0.0.1:{port}");

    let chain = RenameKey::new("server-test", Config::new("user_id", "userId"), echo);
    let server = Server::bind(&addr).expect("valid address");
    (addr, tokio::spawn(server.serve(chain)))
}

/// Connects an HTTP/1.1 client, retrying while the server is still binding.
async fn connect(addr: &str) -> SendRequest<Full<Bytes>> {
    let mut attempts = 0;
    let stream = loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => break stream,
            Err(_) if attempts < 50 => {
                attempts += 1;
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            Err(e) => panic!("server never came up: {e}"),
        }
    };

    let (sender, conn) = http1::handshake(TokioIo::new(stream)).await.expect("handshake");
    tokio::spawn(conn);
    sender
}

async fn post(
    sender: &mut SendRequest<Full<Bytes>>,
    content_type: &str,
    body: &'static [u8],
) -> (StatusCode, Bytes) {
    sender.ready().await.expect("connection ready");
    let req = http::Request::post("/users")
        .header("host", "localhost")
        .header("content-type", content_type)
        .body(Full::new(Bytes::from_static(body)))
        .unwrap();

    let res = sender.send_request(req).await.expect("response");
    let status = res.status();
    let body = res.into_body().collect().await.expect("response body").to_bytes();
    (status, body)
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_server_runs_requests_through_the_chain() {
    let (addr, server) = start();
    let mut sender = connect(&addr).await;

    let (status, body) = post(&mut sender, "application/json", br#"{"user_id":42,"name":"a"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"userId": 42, "name": "a"}));

    // Same connection, second request: not JSON, so it comes back untouched.
    let (status, body) = post(&mut sender, "text/plain", br#"{"user_id":42}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Bytes::from_static(br#"{"user_id":42}"#));

    server.abort();
}

#[tokio::test]
async fn test_server_forwards_non_objects_verbatim() {
    let (addr, server) = start();
    let mut sender = connect(&addr).await;

    let (status, body) = post(&mut sender, "application/json", b" [1, 2, 3] ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Bytes::from_static(b" [1, 2, 3] "));

    server.abort();
}
