//! WeChat Official Account SDK for Rust
//!
//! Server-side client for the WeChat Official Account platform plus the
//! Mini Program login exchange. The SDK fetches, caches and refreshes the
//! account access token for you, and retries a call once when the platform
//! reports the token as invalid (errcode 40001).
//!
//! ## API Coverage
//!
//! | Category | Endpoints |
//! |----------|-----------|
//! | Access Token / JS-SDK ticket | 2 |
//! | Basic (callback IPs, short URL) | 2 |
//! | Temporary Media | 2 |
//! | Menu | 6 |
//! | User Tags | 8 |
//! | Users / Blacklist | 7 |
//! | Mini Program Login | 1 |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wechat_oa_sdk::{WechatOa, types::{AppId, AppSecret}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wechat = WechatOa::builder()
//!         .appid(AppId::new("wx1234567890abcdef")?)
//!         .secret(AppSecret::new("your_secret")?)
//!         .build()?;
//!
//!     let followers = wechat.list_users(None).await?;
//!     println!("{} followers", followers.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Sharing credentials
//!
//! Tokens live in a [`CredentialCache`]. Pass one backed by a shared store to
//! [`WechatOaBuilder::cache`] so several processes reuse one issued token;
//! otherwise each client keeps a private [`MemoryCache`].
//!
//! ## Modules
//!
//! - [`api`] - Endpoint groups (menu, tag, user, media, jssdk, basic, auth)
//! - [`cache`] - Credential cache trait and in-memory implementation
//! - [`client`] - HTTP client and facades
//! - [`credential`] - Expiring credential value
//! - [`error`] - Error types
//! - [`gateway`] - Authenticated request pipeline with invalid-token retry
//! - [`middleware`] - tower middleware for the HTTP transport
//! - [`token`] - Access token management (internal, for advanced users)
//! - [`types`] - Identity and response types
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! use wechat_oa_sdk::WechatError;
//!
//! match result {
//!     Ok(response) => { /* handle success */ }
//!     Err(WechatError::Api { code, message }) => {
//!         eprintln!("API error: {} - {}", code, message);
//!     }
//!     Err(WechatError::Http(e)) => {
//!         eprintln!("HTTP error: {}", e);
//!     }
//!     Err(e) => {
//!         eprintln!("Other error: {}", e);
//!     }
//! }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod token;
pub mod types;

pub use cache::{CredentialCache, MemoryCache};
pub use client::{
    WechatClient, WechatClientBuilder, WechatMiniProgram, WechatOa, WechatOaBuilder,
};
pub use credential::Credential;
pub use error::WechatError;
pub use gateway::{Gateway, Params};
pub use types::ApiResponse;
