//! # rekey
//!
//! A request-pipeline stage that renames one top-level key of JSON request
//! bodies before the request reaches the next handler.
//!
//! ## The contract
//!
//! rekey does one thing to a request: when the body is an uncompressed
//! `application/json` object holding `oldKey`, the value moves to `newKey`.
//! Everything else goes through as received, byte for byte. No request is
//! ever rejected, and no error ever reaches the caller. The worst case is a
//! body that was not renamed.
//!
//! What the surrounding proxy already owns, rekey leaves to it:
//!
//! - **Body-size limits**: rekey buffers whole bodies
//! - **Decompression**: `gzip`, `br` and friends pass through untouched
//! - **Timeouts**: a body read that is cut off counts as a failed read
//!
//! What rekey keeps straight:
//!
//! - **One read per body**: the original stream is drained once, then a
//!   fresh in-memory body is installed
//! - **Length metadata**: declared length, `content-length` and
//!   `transfer-encoding` always describe the body that is forwarded
//! - **Exactly one delegation**: every path calls the next stage once
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rekey::{Config, Request, Response, Server};
//! use rekey::middleware::RenameKey;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rekey::Error> {
//!     let config: Config = serde_json::from_str(r#"{"oldKey":"user_id","newKey":"userId"}"#)
//!         .expect("valid config");
//!     let chain = RenameKey::new("user-id", config, upstream);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(chain).await
//! }
//!
//! async fn upstream(mut req: Request) -> Response {
//!     // {"user_id":42} arrived as {"userId":42}
//!     match req.take_body() {
//!         Some(body) => match body.collect().await {
//!             Ok(bytes) => Response::json(bytes),
//!             Err(_) => Response::status(http::StatusCode::BAD_REQUEST),
//!         },
//!         None => Response::status(http::StatusCode::NO_CONTENT),
//!     }
//! }
//! ```

mod body;
mod config;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;

pub use body::Body;
pub use config::{Config, KeyPair};
pub use error::{BoxError, Error};
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use server::Server;
