//! Top-level JSON key renaming.
//!
//! [`RenameKey`] sits in front of another handler and moves the value of one
//! top-level key of a JSON object body to a new key name:
//!
//! ```text
//! {"user_id":42,"name":"a"}   ──oldKey=user_id, newKey=userId──▶   {"name":"a","userId":42}
//! ```
//!
//! Anything it cannot or should not rewrite goes through untouched. A request
//! is left alone (body not even read) when it has no body, is not
//! `application/json`, carries a `content-encoding` other than `identity`, or
//! the middleware has no usable key pair. Otherwise the body is read into
//! memory and forwarded byte-for-byte as received unless it is a JSON object
//! containing the old key. Empty bodies, invalid JSON, arrays and scalars
//! all count as "not an object".
//!
//! No request fails because of this middleware. Every path ends in exactly
//! one call to the next stage.
//!
//! Body-size limits are the proxy's job: the whole body is buffered.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use serde_json::value::RawValue;
use tracing::{debug, warn};

use crate::body::Body;
use crate::config::{Config, KeyPair};
use crate::error::BoxError;
use crate::handler::{BoxFuture, Handler};
use crate::request::Request;

const JSON_MEDIA_TYPE: &[u8] = b"application/json";

/// Why a body that was read went downstream unchanged.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RewriteError {
    #[error("reading request body: {0}")]
    BodyRead(#[source] BoxError),

    #[error("body is not valid json: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("top-level json value is not an object")]
    NotAnObject,

    #[error("re-encoding renamed body: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Renames one top-level key of JSON request bodies, then calls `next`.
///
/// ```rust,no_run
/// use rekey::{Config, Request, Response, Server};
/// use rekey::middleware::RenameKey;
///
/// async fn upstream(_req: Request) -> Response {
///     Response::text("ok")
/// }
///
/// # async fn run() -> Result<(), rekey::Error> {
/// let chain = RenameKey::new("user-id", Config::new("user_id", "userId"), upstream);
/// Server::bind("0.0.0.0:8080")?.serve(chain).await
/// # }
/// ```
pub struct RenameKey<H> {
    name: Arc<str>,
    keys: Option<Arc<KeyPair>>,
    next: Arc<H>,
}

impl<H: Handler> RenameKey<H> {
    /// Creates the middleware instance `name` in front of `next`.
    ///
    /// A config whose keys are blank or equal after trimming yields a
    /// middleware that forwards every request untouched.
    pub fn new(name: impl Into<String>, config: Config, next: H) -> Self {
        let name: Arc<str> = name.into().into();
        let keys = config.keys().map(Arc::new);
        match &keys {
            Some(keys) => debug!(
                middleware = %name,
                old_key = keys.old_key(),
                new_key = keys.new_key(),
                "rename enabled"
            ),
            None => debug!(middleware = %name, "rename disabled, keys blank or equal"),
        }
        Self { name, keys, next: Arc::new(next) }
    }
}

impl<H: Handler> Handler for RenameKey<H> {
    fn call(&self, mut req: Request) -> BoxFuture {
        let name = Arc::clone(&self.name);
        let keys = self.keys.clone();
        let next = Arc::clone(&self.next);

        Box::pin(async move {
            rewrite(&name, keys.as_deref(), &mut req).await;
            next.call(req).await
        })
    }
}

// ── Decision tree ─────────────────────────────────────────────────────────────

/// Rewrites `req` in place when it is eligible. Never fails.
async fn rewrite(name: &str, keys: Option<&KeyPair>, req: &mut Request) {
    if req.body().is_none() {
        return skipped(name, "no body");
    }
    if !is_json(req.headers()) {
        return skipped(name, "content-type");
    }
    if !is_identity_encoded(req.headers()) {
        return skipped(name, "content-encoding");
    }
    let Some(keys) = keys else {
        return skipped(name, "keys disabled");
    };
    let Some(body) = req.take_body() else {
        return;
    };

    let original = match body.collect().await {
        Ok(bytes) => bytes,
        Err(source) => {
            // The stream is spent. Forward the failure rather than a body
            // that silently lost data.
            let err = RewriteError::BodyRead(source);
            warn!(middleware = name, error = %err, "forwarding request with broken body");
            req.set_body(Body::failed(err));
            return;
        }
    };

    let bytes = match rename_top_level(&original, keys) {
        Ok(Some(renamed)) => {
            debug!(
                middleware = name,
                old_key = keys.old_key(),
                new_key = keys.new_key(),
                old_len = original.len(),
                new_len = renamed.len(),
                "renamed key"
            );
            renamed
        }
        Ok(None) => {
            debug!(middleware = name, len = original.len(), "key absent, body unchanged");
            original
        }
        Err(err @ RewriteError::Encode(_)) => {
            warn!(middleware = name, error = %err, "rolling back to original body");
            original
        }
        Err(err) => {
            debug!(middleware = name, error = %err, "body unchanged");
            original
        }
    };

    req.replace_body(bytes);
}

fn skipped(name: &str, reason: &'static str) {
    debug!(middleware = name, reason, "passthrough");
}

/// `content-type` mentions `application/json`, in any letter case.
fn is_json(headers: &HeaderMap) -> bool {
    headers.get(CONTENT_TYPE).is_some_and(|ct| {
        ct.as_bytes()
            .to_ascii_lowercase()
            .windows(JSON_MEDIA_TYPE.len())
            .any(|w| w == JSON_MEDIA_TYPE)
    })
}

/// No `content-encoding`, an empty one, or `identity`.
fn is_identity_encoded(headers: &HeaderMap) -> bool {
    headers.get(CONTENT_ENCODING).is_none_or(|enc| {
        enc.is_empty() || enc.as_bytes().eq_ignore_ascii_case(b"identity")
    })
}

/// Moves the value under `keys.old_key()` to `keys.new_key()` in a top-level
/// JSON object, replacing whatever `new_key` held.
///
/// `Ok(None)` means there is nothing to rename: the body is blank or the
/// object has no `old_key`. Lookup is exact and case-sensitive.
///
/// Only the outer object is decoded. Member values stay raw JSON text, so
/// they are copied through byte for byte and nesting depth is unbounded:
/// serde_json skips over raw values without recursing.
fn rename_top_level(body: &[u8], keys: &KeyPair) -> Result<Option<Bytes>, RewriteError> {
    if body.trim_ascii().is_empty() {
        return Ok(None);
    }

    // Validates the whole document before looking at its shape.
    let document: Box<RawValue> = serde_json::from_slice(body).map_err(RewriteError::Decode)?;
    if !document.get().trim_start().starts_with('{') {
        return Err(RewriteError::NotAnObject);
    }

    let mut object: BTreeMap<String, Box<RawValue>> =
        serde_json::from_str(document.get()).map_err(RewriteError::Decode)?;
    let Some(moved) = object.remove(keys.old_key()) else {
        return Ok(None);
    };
    object.insert(keys.new_key().to_owned(), moved);

    serde_json::to_vec(&object)
        .map(|encoded| Some(Bytes::from(encoded)))
        .map_err(RewriteError::Encode)
}
