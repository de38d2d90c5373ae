//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! The middleware never builds responses of its own. It hands back whatever
//! the next stage produced. These types exist for the stages at the end of a
//! chain and for the server that writes the result to the wire.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;

/// An outgoing HTTP response.
///
/// ```rust
/// use rekey::Response;
/// use http::StatusCode;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
#[derive(Debug)]
pub struct Response(http::Response<Full<Bytes>>);

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::with_type("application/json", body.into())
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_type("text/plain; charset=utf-8", Bytes::from(body.into()))
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        let mut res = http::Response::new(Full::default());
        *res.status_mut() = code;
        Self(res)
    }

    fn with_type(content_type: &'static str, body: Bytes) -> Self {
        let mut res = http::Response::new(Full::new(body));
        res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self(res)
    }

    pub fn status_code(&self) -> StatusCode { self.0.status() }
    pub fn headers(&self) -> &http::HeaderMap { self.0.headers() }

    pub fn into_inner(self) -> http::Response<Full<Bytes>> { self.0 }
}

impl From<http::Response<Full<Bytes>>> for Response {
    fn from(res: http::Response<Full<Bytes>>) -> Self { Self(res) }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a bare status from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}
