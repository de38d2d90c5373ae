//! Middleware configuration.
//!
//! Field names follow the proxy's plugin configuration format, so a block
//! like the one below deserializes straight into [`Config`]:
//!
//! ```json
//! { "oldKey": "user_id", "newKey": "userId" }
//! ```

use serde::Deserialize;

/// Configuration of one [`RenameKey`](crate::middleware::RenameKey) instance.
///
/// Both keys default to empty, and an empty key disables the rename. Built
/// once when the middleware is created and never changed afterwards.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Top-level key to rename.
    pub old_key: String,
    /// Name the value is moved to.
    pub new_key: String,
}

impl Config {
    pub fn new(old_key: impl Into<String>, new_key: impl Into<String>) -> Self {
        Self { old_key: old_key.into(), new_key: new_key.into() }
    }

    /// The trimmed key pair, or `None` when renaming is disabled: either key
    /// is blank, or both name the same key.
    pub fn keys(&self) -> Option<KeyPair> {
        let old = self.old_key.trim();
        let new = self.new_key.trim();
        if old.is_empty() || new.is_empty() || old == new {
            return None;
        }
        Some(KeyPair { old: old.to_owned(), new: new.to_owned() })
    }
}

/// A validated rename: non-empty, distinct, already trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    old: String,
    new: String,
}

impl KeyPair {
    pub fn old_key(&self) -> &str { &self.old }
    pub fn new_key(&self) -> &str { &self.new }
}
