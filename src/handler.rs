//! The stage contract of a handler chain.
//!
//! # How a chain is stored
//!
//! A middleware owns the stage after it. That stage can be a plain
//! `async fn`, a closure, or another middleware, so the middleware is generic
//! over [`Handler`] and every stage returns the same boxed future type:
//!
//! ```text
//! async fn upstream(req: Request) -> Response { … }   ← end of the chain
//!        ↓ RenameKey::new("rename", config, upstream)
//! RenameKey<upstream>                                 ← Handler, wraps the next stage
//!        ↓ Server::serve(chain)
//! chain.call(req)  at request time                    ← each stage awaits the next
//!        ↓
//! Box::pin(async { upstream(req).await.into_response() })  ← BoxFuture
//! ```
//!
//! Middleware keep the next stage behind an `Arc` so a per-request future can
//! own a handle to it. The cost per stage per request is one `Arc` clone and
//! one boxed future, negligible next to reading a request body off the
//! network.

use std::future::Future;
use std::pin::Pin;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// Every stage produces a different concrete future type, and a trait method
/// cannot name them all. Boxing erases the type. `Pin` is required because an
/// `async` block may hold references into its own state across `.await`
/// points, so it must not move once polled.
///
/// `Send + 'static` so tokio can move it between worker threads and keep it
/// past the `call` that created it.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// One stage of a request pipeline.
///
/// Satisfied automatically by any function or closure with the signature
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// and by every middleware in [`crate::middleware`]. A stage receives the
/// request by value, so nothing can hold on to it after handing it on.
///
/// `call` takes `&self`: one chain serves every connection at once, so a
/// stage must not need exclusive access to itself.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

// `Fn` and not `FnMut`: the server calls the same chain from many tasks
// concurrently. The return type is anything that converts into a
// `Response`, so `async fn`s returning `&'static str`, `String` or a bare
// `StatusCode` work as stages without wrapping.
impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        // Calling the closure only builds the future. Nothing runs until the
        // boxed future below is polled.
        let fut = (self)(req);

        // Map the concrete `Fut` to `Response` and box it so the return type
        // matches the trait signature.
        Box::pin(async move { fut.await.into_response() })
    }
}
