//! Ephemeral key/value store with per-key TTL.
//!
//! Holds refresh tokens and password-reset codes. Absence reads back as an
//! empty string, which callers must never treat as a valid value.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use self::redis::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("ttl must be positive")]
    InvalidTtl,
}

#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Value for `key`, or `""` when absent or expired.
    async fn get(&self, key: &str) -> Result<String, StoreError>;
    /// Write `value` under `key`, replacing any previous value and its TTL.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;
    /// Remove `key`; removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

pub fn refresh_token_key(user_id: Uuid) -> String {
    format!("identity:refresh_token:{user_id}")
}

pub fn forgot_password_key(user_id: Uuid) -> String {
    format!("identity:forgot_password:{user_id}")
}
