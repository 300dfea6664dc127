//! Middleware components for the WeChat SDK.
//!
//! Every upstream request, token issuance included, can be routed through a
//! tower [`Layer`] registered with
//! [`WechatOaBuilder::with_middleware`](crate::client::WechatOaBuilder::with_middleware).
//!
//! - [`LoggingMiddleware`] - Logs method, redacted URL, status and latency
//!
//! ## Usage
//!
//! ```ignore
//! use wechat_oa_sdk::middleware::LoggingMiddleware;
//!
//! let wechat = WechatOa::builder()
//!     .appid(appid)
//!     .secret(secret)
//!     .with_middleware(LoggingMiddleware::new())
//!     .build()?;
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;

pub use logging::{LoggingMiddleware, LoggingMiddlewareService};
