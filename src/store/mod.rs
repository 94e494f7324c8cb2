//! Persistent key-value credential storage.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::Error;

/// Key holding the current access token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the token a renewal request is minted from.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Key holding the JSON-encoded signed-in admin user.
pub const USER_KEY: &str = "user";

/// Byte-string store surviving process restarts (or not, for `MemoryStore`).
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
}
