//! WeChat HTTP Client module
//!
//! This module contains the WechatClient and the account-level facades.

mod wechat_client;
pub use wechat_client::{WechatClient, WechatClientBuilder};

mod wechat_oa;
pub use wechat_oa::WechatOa;

mod mini_program;
pub use mini_program::WechatMiniProgram;

mod builder;
pub use builder::WechatOaBuilder;
