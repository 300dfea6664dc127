use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use log::{debug, info, warn};
use reqwest::{Request, Response};
use tower::{Layer, Service};

/// Logs each upstream call with its status and latency.
///
/// Credentials in the query string are masked before logging.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    verbose: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Log at `debug` with request/response markers instead of one `info` line.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl<S> Layer<S> for LoggingMiddleware
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Service = LoggingMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddlewareService {
            inner,
            verbose: self.verbose,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingMiddlewareService<S> {
    inner: S,
    verbose: bool,
}

const SENSITIVE_PARAMS: &[&str] = &[
    "access_token",
    "secret",
    "appsecret",
    "session_key",
    "js_code",
];

pub(crate) fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let redacted_query = query
        .split('&')
        .map(|param| match param.split_once('=') {
            Some((key, _)) if SENSITIVE_PARAMS.iter().any(|s| key.eq_ignore_ascii_case(s)) => {
                format!("{}=[REDACTED]", key)
            }
            _ => param.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", base, redacted_query)
}

fn log_request(method: &str, url: &str, verbose: bool) {
    if verbose {
        debug!("[WechatOa] >>> {} {}", method, url);
    } else {
        info!("[WechatOa] {} {}", method, url);
    }
}

fn log_response(status: http::StatusCode, duration: std::time::Duration, verbose: bool) {
    if verbose {
        debug!(
            "[WechatOa] <<< {} {} ({:?})",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            duration
        );
    } else {
        info!("[WechatOa] {} ({:?})", status.as_u16(), duration);
    }
}

impl<S, Error> Service<Request> for LoggingMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = Error> + Send + Clone + 'static,
    S::Future: Send,
    Error: std::fmt::Display + Send + 'static,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().as_str().to_string();
        let url = redact_url(req.url().as_str());
        let verbose = self.verbose;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            log_request(&method, &url, verbose);

            let start = Instant::now();
            match inner.call(req).await {
                Ok(response) => {
                    log_response(response.status(), start.elapsed(), verbose);
                    Ok(response)
                }
                Err(e) => {
                    warn!("[WechatOa] {} {} failed: {}", method, url, e);
                    Err(e)
                }
            }
        })
    }
}
