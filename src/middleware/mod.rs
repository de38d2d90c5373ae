//! Middleware layer.
//!
//! A middleware is a [`Handler`](crate::Handler) that owns the next stage of
//! the chain. It may reshape the request, then hands it on exactly once and
//! returns whatever the next stage answered.
//!
//! Built-in middleware:
//! - [`RenameKey`]: renames one top-level key of a JSON request body

mod rename_key;

pub use rename_key::RenameKey;
