//! Mini Program login flow
//!
//! 1. The mini program calls `wx.login()` and posts the code to your server
//! 2. The server exchanges the code for openid and session_key
//!
//! Run with: cargo run --example login_flow

use wechat_oa_sdk::{WechatError, WechatMiniProgram};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mini = WechatMiniProgram::from_credentials("wx1234567890abcdef", "your_app_secret_here")?;
    let js_code = "code_from_wx_login";

    match mini.code_to_session(js_code).await {
        Ok(session) => {
            println!("Login successful!");
            println!("OpenID: {}", session.openid);
            if let Some(unionid) = session.unionid {
                println!("UnionID: {}", unionid);
            }
        }
        Err(WechatError::Api { code, message }) => {
            eprintln!("Login rejected: {} - {}", code, message);
        }
        Err(e) => {
            eprintln!("Login error: {}", e);
        }
    }

    Ok(())
}
