//! Unified error type.

/// Boxed error carried by body streams, matching what hyper and
/// `http-body-util` use for their own body errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by rekey's fallible operations.
///
/// Nothing that happens to a request body is an `Error`: the middleware
/// recovers from every body problem by forwarding the request unchanged.
/// This type surfaces host failures only: a bad listen address, or a port
/// that cannot be bound.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid listen address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
