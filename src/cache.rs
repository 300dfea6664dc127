//! Credential cache collaborator
//!
//! The SDK never owns credential state. Tokens and tickets are written to a
//! host-supplied [`CredentialCache`], so several clients (or processes, with a
//! shared backend) can reuse one issued token.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::WechatError;

/// Key/value store with per-entry time-to-live.
///
/// Implementations are expected to make each operation atomic; the SDK adds
/// no locking of its own.
#[async_trait]
pub trait CredentialCache: Send + Sync {
    /// Fetch a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>, WechatError>;

    /// Store `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), WechatError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), WechatError>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process [`CredentialCache`] used when no cache is configured.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including ones that expired but were not read since.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, WechatError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), WechatError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| WechatError::Cache(format!("ttl out of range for {}", key)))?;
        let entry = Entry { value, expires_at };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), WechatError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
