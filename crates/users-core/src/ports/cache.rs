//! Key-value cache with per-entry expiry

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Cache shared by every request in the process
///
/// Values are opaque bytes; callers choose the encoding. Entries expire on
/// their own once `ttl` has elapsed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}
