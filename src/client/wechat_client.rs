//! WeChat HTTP Client
//!
//! Provides the HTTP transport shared by the token manager, the endpoint
//! gateway and the mini-program login helper.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

use crate::error::WechatError;
use crate::types::{AppId, AppSecret};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";
pub(crate) const DEFAULT_FILE_BASE_URL: &str = "http://file.api.weixin.qq.com";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

type MiddlewareFuture =
    Pin<Box<dyn Future<Output = Result<reqwest::Response, reqwest::Error>> + Send>>;
pub(crate) type MiddlewareExecutor =
    Arc<dyn Fn(reqwest::Request) -> MiddlewareFuture + Send + Sync>;

/// WeChat API Client
///
/// Holds the application identity and a pooled [`reqwest::Client`]. Cheap to
/// clone.
#[derive(Clone)]
pub struct WechatClient {
    http: Client,
    appid: AppId,
    secret: AppSecret,
    base_url: String,
    file_base_url: String,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for WechatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatClient")
            .field("appid", &self.appid)
            .field("base_url", &self.base_url)
            .field("file_base_url", &self.file_base_url)
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl WechatClient {
    /// Create a new client builder
    pub fn builder() -> WechatClientBuilder {
        WechatClientBuilder::default()
    }

    /// Get the appid
    pub fn appid(&self) -> &str {
        self.appid.as_str()
    }

    /// Get the app secret
    pub(crate) fn secret(&self) -> &str {
        self.secret.as_str()
    }

    /// Get the base URL of the API host
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the base URL of the media file host
    pub fn file_base_url(&self) -> &str {
        &self.file_base_url
    }

    /// Absolute URL of an API-host path, e.g. `/cgi-bin/menu/create`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL of a file-host path, e.g. `/cgi-bin/media/upload`
    pub fn file_url(&self, path: &str) -> String {
        format!("{}{}", self.file_base_url, path)
    }

    pub(crate) fn append_access_token(url: &str, access_token: &str) -> String {
        let encoded = utf8_percent_encode(access_token, NON_ALPHANUMERIC);
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}access_token={encoded}")
    }

    /// Returns the underlying [`reqwest::Client`] for building requests.
    ///
    /// Build requests here and send them through
    /// [`send_request`](Self::send_request) so the middleware stack applies.
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn with_middleware_executor(mut self, executor: MiddlewareExecutor) -> Self {
        self.middleware_executor = Some(executor);
        self
    }

    /// Send a prepared request through the configured middleware, if any.
    pub async fn send_request(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::Request,
    ) -> Result<T, WechatError> {
        let response = self.send_request(request).await?;

        if let Err(e) = response.error_for_status_ref() {
            return Err(e.into());
        }

        let value: serde_json::Value = response.json().await?;

        if let Some(errcode) = value.get("errcode").and_then(|v| v.as_i64()) {
            if errcode != 0 {
                let errmsg = value
                    .get("errmsg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown error");
                return Err(WechatError::Api {
                    code: errcode.try_into().unwrap_or(i32::MAX),
                    message: errmsg.to_string(),
                });
            }
        }

        serde_json::from_value(value).map_err(|e| WechatError::Decode(e.to_string()))
    }

    /// Make an unauthenticated GET request to the API host
    ///
    /// Used for calls that authenticate with appid + secret directly
    /// (token issuance, mini-program login).
    ///
    /// # Errors
    /// - Returns `WechatError::Http` for transport failures and non-2xx status codes
    /// - Returns `WechatError::Api` when the body carries a non-zero `errcode`
    /// - Returns `WechatError::Decode` when the body does not match `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WechatError> {
        let request = self.http.get(self.api_url(path)).query(query).build()?;
        self.execute(request).await
    }
}

impl Service<reqwest::Request> for WechatClient {
    type Response = reqwest::Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: reqwest::Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

/// Builder for WechatClient
///
/// # Example
///
/// ```rust
/// use wechat_oa_sdk::client::WechatClient;
/// use wechat_oa_sdk::types::{AppId, AppSecret};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WechatClient::builder()
///         .appid(AppId::new("wx1234567890abcdef")?)
///         .secret(AppSecret::new("abc1234567890abcdef")?)
///         .build()?;
///     assert_eq!(client.appid(), "wx1234567890abcdef");
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct WechatClientBuilder {
    appid: Option<AppId>,
    secret: Option<AppSecret>,
    base_url: Option<String>,
    file_base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl WechatClientBuilder {
    /// Set the AppID
    pub fn appid(mut self, appid: AppId) -> Self {
        self.appid = Some(appid);
        self
    }

    /// Set the AppSecret
    pub fn secret(mut self, secret: AppSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Set the base URL for API calls
    ///
    /// Default: `<https://api.weixin.qq.com>`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the base URL for media upload/download
    ///
    /// Default: `<http://file.api.weixin.qq.com>`
    pub fn file_base_url(mut self, url: impl Into<String>) -> Self {
        self.file_base_url = Some(url.into());
        self
    }

    /// Set the total timeout for requests
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the WechatClient
    ///
    /// # Errors
    /// Returns `WechatError::Config` if appid or secret is not set, or a base
    /// URL is not http(s)
    pub fn build(self) -> Result<WechatClient, WechatError> {
        let appid = self
            .appid
            .ok_or_else(|| WechatError::Config("appid is required".to_string()))?;
        let secret = self
            .secret
            .ok_or_else(|| WechatError::Config("secret is required".to_string()))?;

        let base_url = validate_base_url(
            "base_url",
            self.base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;
        let file_base_url = validate_base_url(
            "file_base_url",
            self.file_base_url
                .unwrap_or_else(|| DEFAULT_FILE_BASE_URL.to_string()),
        )?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(WechatClient {
            http: client,
            appid,
            secret,
            base_url,
            file_base_url,
            middleware_executor: None,
        })
    }
}

fn validate_base_url(name: &str, url: String) -> Result<String, WechatError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(WechatError::Config(format!(
            "{} must start with http:// or https://, got: {}",
            name, url
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> (AppId, AppSecret) {
        (
            AppId::new("wx1234567890abcdef").unwrap(),
            AppSecret::new("secret1234567890ab").unwrap(),
        )
    }

    #[test]
    fn test_builder_default_values() {
        let (appid, secret) = identity();

        let client = WechatClient::builder()
            .appid(appid.clone())
            .secret(secret)
            .build()
            .unwrap();

        assert_eq!(client.appid(), appid.as_str());
        assert_eq!(client.secret(), "secret1234567890ab");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.file_base_url(), DEFAULT_FILE_BASE_URL);
    }

    #[test]
    fn test_builder_custom_base_urls() {
        let (appid, secret) = identity();

        let client = WechatClient::builder()
            .appid(appid)
            .secret(secret)
            .base_url("https://custom.api.example.com/")
            .file_base_url("http://files.example.com")
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://custom.api.example.com");
        assert_eq!(
            client.api_url("/cgi-bin/menu/get"),
            "https://custom.api.example.com/cgi-bin/menu/get"
        );
        assert_eq!(
            client.file_url("/cgi-bin/media/get"),
            "http://files.example.com/cgi-bin/media/get"
        );
    }

    #[test]
    fn test_builder_rejects_non_http_base_url() {
        let (appid, secret) = identity();

        let result = WechatClient::builder()
            .appid(appid)
            .secret(secret)
            .base_url("ftp://example.com")
            .build();

        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[test]
    fn test_builder_missing_appid() {
        let (_, secret) = identity();
        let result = WechatClient::builder().secret(secret).build();
        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[test]
    fn test_builder_missing_secret() {
        let (appid, _) = identity();
        let result = WechatClient::builder().appid(appid).build();
        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[test]
    fn test_append_access_token() {
        assert_eq!(
            WechatClient::append_access_token("https://h/cgi-bin/menu/get", "T1"),
            "https://h/cgi-bin/menu/get?access_token=T1"
        );
        assert_eq!(
            WechatClient::append_access_token("http://h/cgi-bin/media/upload?type=image", "T1"),
            "http://h/cgi-bin/media/upload?type=image&access_token=T1"
        );
    }

    #[test]
    fn test_append_access_token_encodes_value() {
        let url = WechatClient::append_access_token("https://h/p", "a+b/c=");
        assert_eq!(url, "https://h/p?access_token=a%2Bb%2Fc%3D");
    }
}
