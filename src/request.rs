//! Incoming HTTP request type.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderValue, Method, Uri, Version};
use http_body::Body as HttpBody;

use crate::body::Body;
use crate::error::BoxError;

/// An HTTP request travelling through a handler chain.
///
/// Owned by whichever stage is currently handling it. A stage may take the
/// body, swap it for another one and fix up the length metadata before
/// handing the request on.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Option<Body>,
    content_length: Option<u64>,
}

impl Request {
    /// Builds a request from any `http::Request`.
    ///
    /// The declared length comes from a parseable `content-length` header,
    /// falling back to the body's exact size hint. `None` means unknown,
    /// e.g. a chunked upload.
    pub fn from_http<B>(req: http::Request<B>) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let content_length = parts.headers.get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or_else(|| body.size_hint().exact());

        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body: Some(Body::new(body)),
            content_length,
        }
    }

    /// Hands the request on as a plain `http::Request`, e.g. to an upstream
    /// client. An absent body becomes an empty one.
    pub fn into_http(self) -> http::Request<Body> {
        let mut req = http::Request::new(self.body.unwrap_or_default());
        *req.method_mut() = self.method;
        *req.uri_mut() = self.uri;
        *req.version_mut() = self.version;
        *req.headers_mut() = self.headers;
        req
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> Option<&Body> { self.body.as_ref() }
    pub fn content_length(&self) -> Option<u64> { self.content_length }

    /// First value of header `name`, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Removes the body, leaving the request without one.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    /// Installs `body` as is. Length metadata is left alone.
    pub fn set_body(&mut self, body: Body) {
        self.body = Some(body);
    }

    /// Installs a fresh in-memory body over `bytes` and makes every piece
    /// of length metadata agree with it: declared length, `content-length`
    /// header, and no `transfer-encoding`.
    pub fn replace_body(&mut self, bytes: Bytes) {
        let len = bytes.len() as u64;
        self.body = Some(Body::full(bytes));
        self.content_length = Some(len);
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        self.headers.remove(TRANSFER_ENCODING);
    }
}
