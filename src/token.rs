//! Access token management for WeChat API
//!
//! Handles token caching and refresh against an injected
//! [`CredentialCache`]. The manager itself holds no mutable state: every
//! lookup goes to the cache, and concurrent callers that all miss simply
//! refresh independently.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CredentialCache;
use crate::client::WechatClient;
use crate::credential::Credential;
use crate::error::WechatError;

/// The two independently cached credential types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    AccessToken,
    JsApiTicket,
}

impl CredentialKind {
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            CredentialKind::AccessToken => "WeChatAccessToken_",
            CredentialKind::JsApiTicket => "WeChatJsSdk_",
        }
    }

    pub fn cache_key(&self, appid: &str) -> String {
        format!("{}{}", self.cache_prefix(), appid)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Manages the access_token lifecycle
pub struct TokenManager {
    client: WechatClient,
    cache: Arc<dyn CredentialCache>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("appid", &self.client.appid())
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(client: WechatClient, cache: Arc<dyn CredentialCache>) -> Self {
        Self { client, cache }
    }

    pub fn appid(&self) -> &str {
        self.client.appid()
    }

    /// Cache key under which `kind` is stored for this app.
    pub fn cache_key(&self, kind: CredentialKind) -> String {
        kind.cache_key(self.client.appid())
    }

    /// Return a usable access token, refreshing it when the cache has none.
    pub async fn get_token(&self) -> Result<String, WechatError> {
        if let Some(credential) = self.cached_credential(CredentialKind::AccessToken).await? {
            log::debug!(
                "[WechatOa] cached access token for {} valid until {}",
                self.client.appid(),
                credential.expires_at()
            );
            return Ok(credential.value().to_string());
        }

        let response = self.fetch_token().await?;
        log::debug!(
            "[WechatOa] issued access token for {} (expires_in={}s)",
            self.client.appid(),
            response.expires_in
        );

        let credential = self
            .store_credential(
                CredentialKind::AccessToken,
                response.access_token,
                response.expires_in,
            )
            .await?;
        Ok(credential.value().to_string())
    }

    /// Drop the cached access token. Idempotent.
    pub async fn invalidate(&self) -> Result<(), WechatError> {
        self.cache
            .delete(&self.cache_key(CredentialKind::AccessToken))
            .await
    }

    /// Drop the cached JS-API ticket. Idempotent.
    pub async fn invalidate_ticket(&self) -> Result<(), WechatError> {
        self.cache
            .delete(&self.cache_key(CredentialKind::JsApiTicket))
            .await
    }

    /// Look up a still-available credential of `kind`.
    ///
    /// An entry that cannot be decoded is reported as a miss so the next
    /// refresh overwrites it.
    pub async fn cached_credential(
        &self,
        kind: CredentialKind,
    ) -> Result<Option<Credential>, WechatError> {
        let key = self.cache_key(kind);
        let Some(raw) = self.cache.get(&key).await? else {
            return Ok(None);
        };

        match Credential::decode(&raw) {
            Ok(credential) if credential.is_available() => Ok(Some(credential)),
            Ok(_) => Ok(None),
            Err(e) => {
                log::warn!("[WechatOa] ignoring undecodable cache entry {}: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Wrap a freshly issued value in a [`Credential`] and cache it.
    ///
    /// The cache TTL is the server-reported lifetime, so the entry outlives
    /// the credential's own availability window by the expiry margin.
    pub async fn store_credential(
        &self,
        kind: CredentialKind,
        value: String,
        expires_in: i64,
    ) -> Result<Credential, WechatError> {
        let credential = Credential::new(value, expires_in)?;
        let ttl = Duration::from_secs(expires_in.max(0) as u64);
        self.cache
            .set(&self.cache_key(kind), credential.encode()?, ttl)
            .await?;
        Ok(credential)
    }

    async fn fetch_token(&self) -> Result<TokenResponse, WechatError> {
        let path = "/cgi-bin/token";
        let query = [
            ("grant_type", "client_credential"),
            ("appid", self.client.appid()),
            ("secret", self.client.secret()),
        ];

        self.client.get(path, &query).await
    }
}
