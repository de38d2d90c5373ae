//! rekey in front of an echo upstream.
//!
//! Run with:
//!   RUST_LOG=debug REKEY_CONFIG='{"oldKey":"user_id","newKey":"userId"}' \
//!       cargo run --example rename
//!
//! Try:
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"user_id":42,"name":"alice"}'
//!   → {"name":"alice","userId":42}
//!
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '[1,2,3]'
//!   → [1,2,3]

use http::StatusCode;
use rekey::middleware::RenameKey;
use rekey::{Config, Request, Response, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match std::env::var("REKEY_CONFIG") {
        Ok(raw) => serde_json::from_str(&raw).expect("REKEY_CONFIG is not a valid config"),
        Err(_) => Config::new("user_id", "userId"),
    };

    let chain = RenameKey::new("rename-user-id", config, echo);

    Server::bind("0.0.0.0:3000")
        .expect("invalid address")
        .serve(chain)
        .await
        .expect("server error");
}

// Echoes the body as the upstream received it, plus the length it was told.
async fn echo(mut req: Request) -> Response {
    let declared = req.content_length();
    let Some(body) = req.take_body() else {
        return Response::status(StatusCode::NO_CONTENT);
    };

    match body.collect().await {
        Ok(bytes) => {
            tracing::info!(?declared, received = bytes.len(), "upstream got body");
            Response::json(bytes)
        }
        Err(e) => {
            tracing::warn!("upstream body read failed: {e}");
            Response::status(StatusCode::BAD_REQUEST)
        }
    }
}
