//! HTTP server and graceful shutdown.
//!
//! The server hosts one handler chain. Each request read off a connection
//! becomes a [`Request`] with the connection's body stream still unread,
//! goes through the chain, and the chain's [`Response`](crate::Response) is
//! written back.
//!
//! On **SIGTERM** or Ctrl-C the server stops accepting, lets every
//! in-flight connection finish, then returns from [`Server::serve`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::handler::Handler;
use crate::request::Request;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to listen on `addr` once [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use rekey::Server;
    /// let _server = Server::bind("0.0.0.0:3000").unwrap();
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse().map_err(|source| Error::Addr { addr: addr.to_owned(), source })?;
        Ok(Self { addr })
    }

    /// Accepts connections and runs every request through `handler`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve<H: Handler>(self, handler: H) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // One chain for the whole server. Every connection task gets a clone
        // of the `Arc`, which bumps a reference count and leaves the chain
        // itself where it is.
        let handler = Arc::new(handler);

        info!(addr = %self.addr, "rekey listening");

        // Every connection task, so shutdown can wait for them. A `JoinSet`
        // owns its tasks: dropping the set would abort them, joining it waits.
        let mut tasks = tokio::task::JoinSet::new();

        // `select!` polls the shutdown future through `&mut` on every loop
        // iteration, so it has to stay at one address. `tokio::pin!` pins it
        // on the stack without a heap allocation.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Branches are polled top to bottom instead of at random.
                // Shutdown comes first, so a SIGTERM stops accepting even
                // while connections are still queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);

                    // hyper has its own IO traits. `TokioIo` adapts tokio's
                    // `AsyncRead`/`AsyncWrite` to them.
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // `service_fn` turns the closure into a hyper `Service`.
                        // The closure runs once per request on this
                        // connection, not once per connection, hence a fresh
                        // `Arc` clone for every request future.
                        let svc = service_fn(move |req| dispatch(Arc::clone(&handler), req, peer));

                        // The auto builder sniffs the connection preface and
                        // speaks HTTP/1.1 or HTTP/2, whatever the client uses.
                        // `TokioExecutor` spawns the HTTP/2 stream tasks.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the set does not grow without bound.
                // The guard disables the branch while the set is empty, since
                // `join_next` on an empty set resolves to `None` at once.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // The listener is still open but no longer polled, so new
        // connections wait in the backlog until it is dropped below.
        while tasks.join_next().await.is_some() {}

        info!("rekey stopped");
        Ok(())
    }
}

/// Runs one request through the chain. Failures are the chain's to turn into
/// responses, so hyper never sees an error.
async fn dispatch<H: Handler>(
    handler: Arc<H>,
    req: hyper::Request<Incoming>,
    peer: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    debug!(peer = %peer, method = %req.method(), path = req.uri().path(), "request");
    let response = handler.call(Request::from_http(req)).await;
    Ok(response.into_inner())
}

/// Resolves on the first SIGTERM (Kubernetes, `kill`) or Ctrl-C.
/// Only Ctrl-C exists on non-Unix platforms.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // A future that never resolves, so only the Ctrl-C branch can fire.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
