use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request as ReqwestRequest, Response as ReqwestResponse};
use tower::{Layer, Service};

use crate::api::WechatContext;
use crate::cache::{CredentialCache, MemoryCache};
use crate::error::WechatError;
use crate::token::TokenManager;
use crate::types::{AppId, AppSecret};

use super::wechat_client::{MiddlewareExecutor, WechatClient};
use super::WechatOa;

type MiddlewareFuture =
    Pin<Box<dyn Future<Output = Result<ReqwestResponse, reqwest::Error>> + Send>>;

/// Builder for [`WechatOa`]
///
/// `appid` and `secret` are required. Without [`cache`](Self::cache) the
/// client keeps credentials in a private [`MemoryCache`].
#[must_use]
#[derive(Default)]
pub struct WechatOaBuilder<M = ()> {
    appid: Option<AppId>,
    secret: Option<AppSecret>,
    base_url: Option<String>,
    file_base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    cache: Option<Arc<dyn CredentialCache>>,
    middleware: Option<M>,
}

impl<M> std::fmt::Debug for WechatOaBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatOaBuilder")
            .field("appid", &self.appid)
            .field("base_url", &self.base_url)
            .field("file_base_url", &self.file_base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("cache", &self.cache.as_ref().map(|_| ".."))
            .field("middleware", &self.middleware.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl<M> WechatOaBuilder<M> {
    pub fn appid(mut self, appid: AppId) -> Self {
        self.appid = Some(appid);
        self
    }

    pub fn secret(mut self, secret: AppSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Host serving media upload and download.
    pub fn file_base_url(mut self, url: impl Into<String>) -> Self {
        self.file_base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Share credentials through an external cache.
    pub fn cache(mut self, cache: Arc<dyn CredentialCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_middleware<M2>(self, middleware: M2) -> WechatOaBuilder<M2>
    where
        M2: Layer<WechatClient> + Clone + Send + Sync + 'static,
    {
        WechatOaBuilder {
            appid: self.appid,
            secret: self.secret,
            base_url: self.base_url,
            file_base_url: self.file_base_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            cache: self.cache,
            middleware: Some(middleware),
        }
    }

    pub fn build(self) -> Result<WechatOa, WechatError>
    where
        M: Layer<WechatClient> + Clone + Send + Sync + 'static,
        M::Service: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <M::Service as Service<ReqwestRequest>>::Future: Send + 'static,
    {
        let appid = self
            .appid
            .ok_or_else(|| WechatError::Config("appid is required".to_string()))?;
        let secret = self
            .secret
            .ok_or_else(|| WechatError::Config("secret is required".to_string()))?;

        let mut client_builder = WechatClient::builder().appid(appid).secret(secret);
        if let Some(url) = self.base_url {
            client_builder = client_builder.base_url(url);
        }
        if let Some(url) = self.file_base_url {
            client_builder = client_builder.file_base_url(url);
        }
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            client_builder = client_builder.connect_timeout(timeout);
        }
        let mut client = client_builder.build()?;

        if let Some(middleware) = self.middleware {
            let service = middleware.layer(client.clone());
            let executor = make_middleware_executor(service);
            client = client.with_middleware_executor(executor);
        }

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new()) as Arc<dyn CredentialCache>);
        let token_manager = Arc::new(TokenManager::new(client.clone(), cache));
        let context = Arc::new(WechatContext::new(Arc::new(client), token_manager));

        Ok(WechatOa::from(context))
    }
}

pub(crate) fn make_middleware_executor<S>(service: S) -> MiddlewareExecutor
where
    S: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    let service = Arc::new(service);

    Arc::new(move |request: ReqwestRequest| -> MiddlewareFuture {
        let mut service = (*service).clone();
        Box::pin(async move { service.call(request).await })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn identity() -> (AppId, AppSecret) {
        (
            AppId::new("wx1234567890abcdef").unwrap(),
            AppSecret::new("secret1234567890ab").unwrap(),
        )
    }

    async fn mount_token(mock_server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/cgi-bin/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T1",
                "expires_in": 7200
            })))
            .mount(mock_server)
            .await;
    }

    #[test]
    fn test_builder_default_values() {
        let (appid, secret) = identity();

        let wechat = WechatOa::builder()
            .appid(appid.clone())
            .secret(secret)
            .build()
            .unwrap();

        assert_eq!(wechat.appid(), appid.as_str());
        assert_eq!(
            wechat.context().client().base_url(),
            "https://api.weixin.qq.com"
        );
        assert_eq!(
            wechat.context().client().file_base_url(),
            "http://file.api.weixin.qq.com"
        );
    }

    #[test]
    fn test_builder_custom_values() {
        let (appid, secret) = identity();

        let wechat = WechatOa::builder()
            .appid(appid)
            .secret(secret)
            .base_url("https://custom.api.example.com/")
            .file_base_url("https://files.example.com")
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(wechat.appid(), "wx1234567890abcdef");
        assert_eq!(
            wechat.context().client().base_url(),
            "https://custom.api.example.com"
        );
        assert_eq!(
            wechat.context().client().file_base_url(),
            "https://files.example.com"
        );
    }

    #[test]
    fn test_builder_rejects_bad_base_url() {
        let (appid, secret) = identity();

        let result = WechatOa::builder()
            .appid(appid)
            .secret(secret)
            .base_url("ftp://api.example.com")
            .build();

        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[tokio::test]
    async fn test_shared_cache_is_used() {
        let (appid, secret) = identity();
        let cache = Arc::new(MemoryCache::new());
        let mock_server = MockServer::start().await;
        mount_token(&mock_server).await;

        let wechat = WechatOa::builder()
            .appid(appid)
            .secret(secret)
            .base_url(mock_server.uri())
            .cache(cache.clone())
            .build()
            .unwrap();
        wechat.get_access_token().await.unwrap();

        assert!(cache
            .get("WeChatAccessToken_wx1234567890abcdef")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_middleware_configured_and_executes() {
        #[derive(Clone)]
        struct FlagLayer {
            flag: Arc<AtomicBool>,
        }

        impl Layer<WechatClient> for FlagLayer {
            type Service = FlagService;

            fn layer(&self, inner: WechatClient) -> Self::Service {
                FlagService {
                    inner,
                    flag: Arc::clone(&self.flag),
                }
            }
        }

        #[derive(Clone)]
        struct FlagService {
            inner: WechatClient,
            flag: Arc<AtomicBool>,
        }

        impl Service<ReqwestRequest> for FlagService {
            type Response = ReqwestResponse;
            type Error = reqwest::Error;
            type Future = MiddlewareFuture;

            fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                Poll::Ready(Ok(()))
            }

            fn call(&mut self, req: ReqwestRequest) -> Self::Future {
                self.flag.store(true, Ordering::SeqCst);
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
        }

        let (appid, secret) = identity();
        let middleware_invoked = Arc::new(AtomicBool::new(false));
        let layer = FlagLayer {
            flag: Arc::clone(&middleware_invoked),
        };

        let mock_server = MockServer::start().await;
        mount_token(&mock_server).await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/tags/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tags": []
            })))
            .mount(&mock_server)
            .await;

        let wechat = WechatOa::builder()
            .appid(appid)
            .secret(secret)
            .base_url(mock_server.uri())
            .with_middleware(layer)
            .build()
            .unwrap();

        let tags = wechat.list_tags().await.unwrap();

        assert!(tags.is_empty());
        assert!(middleware_invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_builder_with_logging_middleware_builds() {
        let (appid, secret) = identity();

        let mock_server = MockServer::start().await;
        mount_token(&mock_server).await;

        let wechat = WechatOa::builder()
            .appid(appid)
            .secret(secret)
            .base_url(mock_server.uri())
            .with_middleware(crate::middleware::LoggingMiddleware::new())
            .build()
            .unwrap();

        assert_eq!(wechat.get_access_token().await.unwrap(), "T1");
    }

    #[test]
    fn test_missing_appid() {
        let (_, secret) = identity();

        let result = WechatOa::builder().secret(secret).build();

        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[test]
    fn test_missing_secret() {
        let (appid, _) = identity();

        let result = WechatOa::builder().appid(appid).build();

        assert!(matches!(result, Err(WechatError::Config(_))));
    }
}
