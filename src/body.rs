//! Request body stream.
//!
//! A [`Body`] is single-use: it can be read once, front to back. Code that
//! needs to look at the bytes *and* pass the request on does it in two
//! steps. First [`Body::collect`] drains (and drops) the original stream,
//! then [`Body::full`] builds a fresh stream over the bytes that should go
//! downstream. Nothing ever tries to read the same stream twice.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

use crate::error::BoxError;

/// The body of a [`Request`](crate::Request).
pub struct Body {
    kind: Kind,
}

enum Kind {
    /// In-memory bytes, yielded as a single frame. `None` once read (or empty).
    Full(Option<Bytes>),
    /// Any other body, e.g. the connection's `hyper::body::Incoming`.
    Stream(UnsyncBoxBody<Bytes, BoxError>),
    /// A body whose read already broke. Yields the stored error once.
    Failed(Option<BoxError>),
}

impl Body {
    /// Wraps an arbitrary `http_body::Body`.
    pub fn new<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self { kind: Kind::Stream(body.map_err(Into::into).boxed_unsync()) }
    }

    /// A fresh, independently readable body over `bytes`.
    pub fn full(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let bytes = if bytes.is_empty() { None } else { Some(bytes) };
        Self { kind: Kind::Full(bytes) }
    }

    pub fn empty() -> Self {
        Self { kind: Kind::Full(None) }
    }

    /// A body that fails with `err` on its first read.
    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self { kind: Kind::Failed(Some(err.into())) }
    }

    /// Reads the whole body into memory.
    ///
    /// Consumes `self`, so the underlying stream is released exactly once,
    /// whether the read succeeds or not.
    pub async fn collect(self) -> Result<Bytes, BoxError> {
        match self.kind {
            Kind::Full(bytes) => Ok(bytes.unwrap_or_default()),
            Kind::Stream(stream) => Ok(BodyExt::collect(stream).await?.to_bytes()),
            Kind::Failed(err) => Err(err.unwrap_or_else(|| "body stream already failed".into())),
        }
    }
}

impl Default for Body {
    fn default() -> Self { Self::empty() }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            Kind::Full(_) => "full",
            Kind::Stream(_) => "stream",
            Kind::Failed(_) => "failed",
        };
        f.debug_struct("Body").field("kind", &kind).finish()
    }
}

impl HttpBody for Body {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match &mut self.get_mut().kind {
            Kind::Full(bytes) => Poll::Ready(bytes.take().map(|b| Ok(Frame::data(b)))),
            Kind::Stream(stream) => Pin::new(stream).poll_frame(cx),
            Kind::Failed(err) => Poll::Ready(err.take().map(Err)),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.kind {
            Kind::Full(bytes) => bytes.is_none(),
            Kind::Stream(stream) => stream.is_end_stream(),
            Kind::Failed(err) => err.is_none(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.kind {
            Kind::Full(bytes) => {
                SizeHint::with_exact(bytes.as_ref().map_or(0, |b| b.len() as u64))
            }
            Kind::Stream(stream) => stream.size_hint(),
            Kind::Failed(_) => SizeHint::default(),
        }
    }
}
