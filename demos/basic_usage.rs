//! Basic Official Account usage
//!
//! Builds a client with request logging, creates a menu, pages through
//! followers and signs a JS-SDK config.
//!
//! Run with: cargo run --example basic_usage

use wechat_oa_sdk::{
    api::{MenuButton, DEFAULT_LANG},
    middleware::LoggingMiddleware,
    types::{AppId, AppSecret},
    WechatOa,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let wechat = WechatOa::builder()
        .appid(AppId::new("wx1234567890abcdef")?)
        .secret(AppSecret::new("your_app_secret_here")?)
        .with_middleware(LoggingMiddleware::new())
        .build()?;

    wechat
        .create_menu(vec![
            MenuButton::click("今日歌曲", "V1001_TODAY_MUSIC"),
            MenuButton::parent(
                "菜单",
                vec![MenuButton::view("搜索", "https://www.soso.com/")],
            ),
        ])
        .await?;

    let mut cursor: Option<String> = None;
    loop {
        let page = wechat.list_users(cursor.as_deref()).await?;
        for openid in &page.data.openid {
            let user = wechat.get_user(openid, DEFAULT_LANG).await?;
            println!("{} subscribed={}", user.openid, user.subscribe);
        }
        if page.next_openid.is_empty() || page.count == 0 {
            break;
        }
        cursor = Some(page.next_openid);
    }

    let config = wechat
        .jsapi_config(&["chooseImage"], false, "https://example.com/page")
        .await?;
    println!("wx.config({})", config.to_json()?);

    Ok(())
}
