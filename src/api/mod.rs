//! WeChat Official Account API modules
//!
//! - [`basic`] - Callback server IPs and URL shortening
//! - [`jssdk`] - JS-API ticket and `wx.config` signing
//! - [`media`] - Temporary media upload and download
//! - [`menu`] - Custom and conditional menus
//! - [`tag`] - User tag management
//! - [`user`] - Follower listing, profiles, remarks and blacklist
//! - [`auth`] - Mini Program code-to-session login
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wechat_oa_sdk::{WechatOa, types::{AppId, AppSecret}};
//! ```

pub mod auth;
pub mod basic;
pub mod jssdk;
pub mod media;
pub mod menu;
pub mod tag;
pub mod r#trait;
pub mod user;

pub use auth::{AuthApi, LoginResponse};
pub use basic::BasicApi;
pub use jssdk::{JsApiConfig, JsSdkApi};
pub use media::{MediaApi, MediaType, MediaUploadResponse};
pub use menu::{MatchRule, MenuApi, MenuButton};
pub use r#trait::{WechatApi, WechatContext};
pub use tag::{OpenIdList, Tag, TagApi, TagUsersResponse};
pub use user::{UserApi, UserInfo, UserListResponse, DEFAULT_LANG};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::WechatContext;
    use crate::cache::MemoryCache;
    use crate::client::WechatClient;
    use crate::token::TokenManager;
    use crate::types::{AppId, AppSecret};

    pub(crate) fn create_test_context(base_url: &str) -> Arc<WechatContext> {
        create_test_context_with_cache(base_url, Arc::new(MemoryCache::new()))
    }

    pub(crate) fn create_test_context_with_cache(
        base_url: &str,
        cache: Arc<MemoryCache>,
    ) -> Arc<WechatContext> {
        let client = WechatClient::builder()
            .appid(AppId::new("wx1234567890abcdef").unwrap())
            .secret(AppSecret::new("secret1234567890ab").unwrap())
            .base_url(base_url)
            .file_base_url(base_url)
            .build()
            .unwrap();
        let token_manager = TokenManager::new(client.clone(), cache);
        Arc::new(WechatContext::new(
            Arc::new(client),
            Arc::new(token_manager),
        ))
    }

    pub(crate) async fn mount_token(server: &MockServer, token: &str) {
        Mock::given(method("GET"))
            .and(path("/cgi-bin/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "expires_in": 7200
            })))
            .mount(server)
            .await;
    }
}
