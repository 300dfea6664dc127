//! Mini Program Login API
//!
//! Exchanges the `code` returned by `wx.login()` for the user's session. The
//! call authenticates with appid + secret directly, so it needs neither an
//! access token nor a cache.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::WechatClient;
use crate::error::WechatError;

/// Login response from code2Session API
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    /// User's unique ID under the Mini Program
    #[serde(default)]
    pub openid: String,
    /// Session key for decrypting user data
    #[serde(default)]
    pub session_key: String,
    /// User's unique ID across WeChat platform (optional)
    #[serde(default)]
    pub unionid: Option<String>,
}

impl LoginResponse {
    pub fn new(
        openid: impl Into<String>,
        session_key: impl Into<String>,
        unionid: Option<String>,
    ) -> Self {
        Self {
            openid: openid.into(),
            session_key: session_key.into(),
            unionid,
        }
    }
}

/// Mini Program login API
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Arc<WechatClient>,
}

impl AuthApi {
    /// Create a new AuthApi instance
    pub fn new(client: Arc<WechatClient>) -> Self {
        Self { client }
    }

    /// Login with code from wx.login()
    ///
    /// GET /sns/jscode2session
    ///
    /// # Arguments
    /// * `js_code` - The code obtained from wx.login() on the client
    ///
    /// # Errors
    /// - `WechatError::Api` when the platform rejects the code (e.g. 40029)
    /// - `WechatError::Http` for transport failures
    pub async fn login(&self, js_code: &str) -> Result<LoginResponse, WechatError> {
        let query = [
            ("appid", self.client.appid()),
            ("secret", self.client.secret()),
            ("js_code", js_code),
            ("grant_type", "authorization_code"),
        ];

        let response: LoginResponse = self.client.get("/sns/jscode2session", &query).await?;
        log::debug!(
            "[WechatMiniProgram] code exchanged for {}",
            self.client.appid()
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppId, AppSecret};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auth_api(base_url: &str) -> AuthApi {
        let client = WechatClient::builder()
            .appid(AppId::new("wx1234567890abcdef").unwrap())
            .secret(AppSecret::new("secret1234567890ab").unwrap())
            .base_url(base_url)
            .build()
            .unwrap();
        AuthApi::new(Arc::new(client))
    }

    #[test]
    fn test_login_response_with_unionid() {
        let json = r#"{
            "openid": "oABC123xyz",
            "session_key": "test_session_key_abc",
            "unionid": "uABC123union"
        }"#;

        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.openid, "oABC123xyz");
        assert_eq!(response.session_key, "test_session_key_abc");
        assert_eq!(response.unionid, Some("uABC123union".to_string()));
    }

    #[tokio::test]
    async fn test_login_sends_credentials_in_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sns/jscode2session"))
            .and(query_param("appid", "wx1234567890abcdef"))
            .and(query_param("secret", "secret1234567890ab"))
            .and(query_param("js_code", "CODE"))
            .and(query_param("grant_type", "authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "openid": "o1",
                "session_key": "sk"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = auth_api(&mock_server.uri()).login("CODE").await.unwrap();
        assert_eq!(response.openid, "o1");
        assert_eq!(response.session_key, "sk");
        assert!(response.unionid.is_none());
    }

    #[tokio::test]
    async fn test_login_invalid_code() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sns/jscode2session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 40029,
                "errmsg": "invalid code"
            })))
            .mount(&mock_server)
            .await;

        let err = auth_api(&mock_server.uri()).login("bad").await.unwrap_err();
        assert!(matches!(err, WechatError::Api { code: 40029, .. }));
    }
}
