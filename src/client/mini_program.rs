//! Mini Program login client

use std::sync::Arc;

use crate::api::auth::{AuthApi, LoginResponse};
use crate::error::WechatError;
use crate::types::{AppId, AppSecret};

use super::WechatClient;

/// Stateless Mini Program client
///
/// Only exchanges `wx.login()` codes for sessions; holds no token and no cache.
///
/// ```rust,ignore
/// let mini = WechatMiniProgram::from_credentials("wx1234567890abcdef", "your_secret")?;
/// let session = mini.code_to_session("code").await?;
/// ```
#[derive(Debug, Clone)]
pub struct WechatMiniProgram {
    client: Arc<WechatClient>,
}

impl WechatMiniProgram {
    pub fn new(client: WechatClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Build with default endpoints.
    ///
    /// # Errors
    /// Returns `WechatError::Config` if either value is blank
    pub fn from_credentials(
        appid: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, WechatError> {
        let client = WechatClient::builder()
            .appid(AppId::new(appid)?)
            .secret(AppSecret::new(secret)?)
            .build()?;
        Ok(Self::new(client))
    }

    pub fn appid(&self) -> &str {
        self.client.appid()
    }

    /// GET /sns/jscode2session
    pub async fn code_to_session(&self, js_code: &str) -> Result<LoginResponse, WechatError> {
        AuthApi::new(self.client.clone()).login(js_code).await
    }
}
