//! Basic platform utilities: callback server IPs and URL shortening.

use std::sync::Arc;

use serde_json::json;

use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::gateway::Params;

/// Basic platform API
pub struct BasicApi {
    context: Arc<WechatContext>,
}

impl BasicApi {
    /// Create a new BasicApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// IP addresses the platform sends callbacks from
    ///
    /// POST /cgi-bin/getcallbackip
    pub async fn get_callback_ip(&self) -> Result<Vec<String>, WechatError> {
        self.context
            .gateway
            .post(
                &self.context.client().api_url("/cgi-bin/getcallbackip"),
                Params::none(),
            )
            .await?
            .field("ip_list")
    }

    /// Convert a long URL into a `w.url.cn` short link
    ///
    /// POST /cgi-bin/shorturl
    pub async fn short_url(&self, long_url: &str) -> Result<String, WechatError> {
        self.context
            .gateway
            .post_json(
                &self.context.client().api_url("/cgi-bin/shorturl"),
                json!({ "action": "long2short", "long_url": long_url }),
            )
            .await?
            .field("short_url")
    }
}

impl WechatApi for BasicApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{create_test_context, mount_token};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_callback_ip() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/getcallbackip"))
            .and(query_param("access_token", "T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip_list": ["127.0.0.1", "127.0.0.2", "101.226.103.0/25"]
            })))
            .mount(&mock_server)
            .await;

        let api = BasicApi::new(create_test_context(&mock_server.uri()));
        let ips = api.get_callback_ip().await.unwrap();
        assert_eq!(ips.len(), 3);
        assert_eq!(ips[2], "101.226.103.0/25");
    }

    #[tokio::test]
    async fn test_short_url() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/shorturl"))
            .and(body_json(json!({
                "action": "long2short",
                "long_url": "http://wap.koudaitong.com/v2/showcase/goods?alias=128wi9shh"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "short_url": "http://w.url.cn/s/AvCo6Ih"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = BasicApi::new(create_test_context(&mock_server.uri()));
        let short = api
            .short_url("http://wap.koudaitong.com/v2/showcase/goods?alias=128wi9shh")
            .await
            .unwrap();
        assert_eq!(short, "http://w.url.cn/s/AvCo6Ih");
    }
}
