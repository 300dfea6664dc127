//! WeChat API trait and context
//!
//! Provides the base trait and context for all WeChat API implementations.

use std::sync::Arc;

use crate::client::WechatClient;
use crate::gateway::Gateway;
use crate::token::TokenManager;

/// Context holding shared resources for WeChat API implementations.
///
/// Wraps the [`Gateway`], which in turn owns the HTTP client and token
/// manager.
#[derive(Clone)]
pub struct WechatContext {
    pub(crate) gateway: Gateway,
}

impl std::fmt::Debug for WechatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatContext")
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl WechatContext {
    /// Create a new WechatContext
    pub fn new(client: Arc<WechatClient>, token_manager: Arc<TokenManager>) -> Self {
        Self {
            gateway: Gateway::new(client, token_manager),
        }
    }

    /// Get a reference to the WeChat HTTP client.
    pub fn client(&self) -> &WechatClient {
        self.gateway.client()
    }

    /// Get a reference to the token manager.
    pub fn token_manager(&self) -> &TokenManager {
        self.gateway.token_manager()
    }

    /// Get a reference to the request gateway.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

/// Trait for WeChat API implementations.
///
/// All API modules implement this trait to expose the shared context.
pub trait WechatApi: Send + Sync {
    /// Get a reference to the WeChat context
    fn context(&self) -> &WechatContext;
}
