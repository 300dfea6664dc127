//! Unified WeChat Official Account client

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::api::basic::BasicApi;
use crate::api::jssdk::{JsApiConfig, JsSdkApi};
use crate::api::media::{MediaApi, MediaType, MediaUploadResponse};
use crate::api::menu::{MatchRule, MenuApi, MenuButton};
use crate::api::tag::{Tag, TagApi, TagUsersResponse};
use crate::api::user::{UserApi, UserInfo, UserListResponse};
use crate::api::WechatContext;
use crate::error::WechatError;

/// Unified WeChat Official Account client
///
/// The main entry point of the SDK. Every method fetches (or reuses) the
/// access token, calls the endpoint and retries once if the platform reports
/// the token as invalid (errcode 40001).
///
/// # Example
///
/// ```rust,ignore
/// use wechat_oa_sdk::WechatOa;
/// use wechat_oa_sdk::types::{AppId, AppSecret};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let wechat = WechatOa::builder()
///         .appid(AppId::new("wx1234567890abcdef")?)
///         .secret(AppSecret::new("your_secret")?)
///         .build()?;
///
///     let tags = wechat.list_tags().await?;
///     println!("{} tags", tags.len());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WechatOa {
    context: Arc<WechatContext>,
}

impl std::fmt::Debug for WechatOa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatOa")
            .field("appid", &self.appid())
            .finish_non_exhaustive()
    }
}

impl WechatOa {
    pub fn builder() -> super::builder::WechatOaBuilder {
        super::builder::WechatOaBuilder::default()
    }

    pub fn appid(&self) -> &str {
        self.context.client().appid()
    }

    /// Shared context, for calling API modules directly.
    pub fn context(&self) -> Arc<WechatContext> {
        self.context.clone()
    }

    pub async fn get_access_token(&self) -> Result<String, WechatError> {
        self.context.token_manager().get_token().await
    }

    pub async fn invalidate_token(&self) -> Result<(), WechatError> {
        self.context.token_manager().invalidate().await
    }

    // Basic API

    pub async fn get_callback_ip(&self) -> Result<Vec<String>, WechatError> {
        BasicApi::new(self.context.clone()).get_callback_ip().await
    }

    pub async fn short_url(&self, long_url: &str) -> Result<String, WechatError> {
        BasicApi::new(self.context.clone()).short_url(long_url).await
    }

    // JS-SDK API

    pub async fn get_jsapi_ticket(&self) -> Result<String, WechatError> {
        JsSdkApi::new(self.context.clone()).get_jsapi_ticket().await
    }

    pub async fn invalidate_jsapi_ticket(&self) -> Result<(), WechatError> {
        JsSdkApi::new(self.context.clone())
            .invalidate_jsapi_ticket()
            .await
    }

    pub async fn jsapi_config(
        &self,
        apis: &[&str],
        debug: bool,
        url: &str,
    ) -> Result<JsApiConfig, WechatError> {
        JsSdkApi::new(self.context.clone())
            .jsapi_config(apis, debug, url)
            .await
    }

    // Media API

    pub async fn upload_media(
        &self,
        media_type: MediaType,
        file: impl AsRef<Path>,
    ) -> Result<MediaUploadResponse, WechatError> {
        MediaApi::new(self.context.clone())
            .upload_media(media_type, file)
            .await
    }

    pub async fn get_media(&self, media_id: &str) -> Result<Vec<u8>, WechatError> {
        MediaApi::new(self.context.clone()).get_media(media_id).await
    }

    pub async fn get_media_base64(&self, media_id: &str) -> Result<String, WechatError> {
        MediaApi::new(self.context.clone())
            .get_media_base64(media_id)
            .await
    }

    // Menu API

    pub async fn create_menu(&self, buttons: Vec<MenuButton>) -> Result<(), WechatError> {
        MenuApi::new(self.context.clone()).create_menu(buttons).await
    }

    pub async fn get_menu(&self) -> Result<Value, WechatError> {
        MenuApi::new(self.context.clone()).get_menu().await
    }

    pub async fn delete_menu(&self) -> Result<(), WechatError> {
        MenuApi::new(self.context.clone()).delete_menu().await
    }

    pub async fn add_conditional_menu(
        &self,
        buttons: Vec<MenuButton>,
        match_rule: MatchRule,
    ) -> Result<String, WechatError> {
        MenuApi::new(self.context.clone())
            .add_conditional_menu(buttons, match_rule)
            .await
    }

    pub async fn delete_conditional_menu(&self, menu_id: &str) -> Result<(), WechatError> {
        MenuApi::new(self.context.clone())
            .delete_conditional_menu(menu_id)
            .await
    }

    pub async fn try_match_menu(&self, user_id: &str) -> Result<Value, WechatError> {
        MenuApi::new(self.context.clone())
            .try_match_menu(user_id)
            .await
    }

    // Tag API

    pub async fn create_tag(&self, name: &str) -> Result<Tag, WechatError> {
        TagApi::new(self.context.clone()).create_tag(name).await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, WechatError> {
        TagApi::new(self.context.clone()).list_tags().await
    }

    pub async fn update_tag(&self, tag_id: i64, name: &str) -> Result<(), WechatError> {
        TagApi::new(self.context.clone())
            .update_tag(tag_id, name)
            .await
    }

    pub async fn delete_tag(&self, tag_id: i64) -> Result<(), WechatError> {
        TagApi::new(self.context.clone()).delete_tag(tag_id).await
    }

    pub async fn get_tag_users(
        &self,
        tag_id: i64,
        next_openid: Option<&str>,
    ) -> Result<TagUsersResponse, WechatError> {
        TagApi::new(self.context.clone())
            .get_tag_users(tag_id, next_openid)
            .await
    }

    pub async fn tag_users(&self, openids: &[&str], tag_id: i64) -> Result<(), WechatError> {
        TagApi::new(self.context.clone())
            .tag_users(openids, tag_id)
            .await
    }

    pub async fn untag_users(&self, openids: &[&str], tag_id: i64) -> Result<(), WechatError> {
        TagApi::new(self.context.clone())
            .untag_users(openids, tag_id)
            .await
    }

    pub async fn get_user_tags(&self, openid: &str) -> Result<Vec<i64>, WechatError> {
        TagApi::new(self.context.clone())
            .get_user_tags(openid)
            .await
    }

    // User API

    pub async fn list_users(
        &self,
        next_openid: Option<&str>,
    ) -> Result<UserListResponse, WechatError> {
        UserApi::new(self.context.clone())
            .list_users(next_openid)
            .await
    }

    pub async fn get_user(&self, openid: &str, lang: &str) -> Result<UserInfo, WechatError> {
        UserApi::new(self.context.clone())
            .get_user(openid, lang)
            .await
    }

    pub async fn get_users(
        &self,
        openids: &[&str],
        lang: &str,
    ) -> Result<Vec<UserInfo>, WechatError> {
        UserApi::new(self.context.clone())
            .get_users(openids, lang)
            .await
    }

    pub async fn remark_user(&self, openid: &str, remark: &str) -> Result<(), WechatError> {
        UserApi::new(self.context.clone())
            .remark_user(openid, remark)
            .await
    }

    pub async fn get_blacklist(
        &self,
        begin_openid: Option<&str>,
    ) -> Result<UserListResponse, WechatError> {
        UserApi::new(self.context.clone())
            .get_blacklist(begin_openid)
            .await
    }

    pub async fn batch_blacklist(&self, openids: &[&str]) -> Result<(), WechatError> {
        UserApi::new(self.context.clone())
            .batch_blacklist(openids)
            .await
    }

    pub async fn batch_unblacklist(&self, openids: &[&str]) -> Result<(), WechatError> {
        UserApi::new(self.context.clone())
            .batch_unblacklist(openids)
            .await
    }
}

impl From<Arc<WechatContext>> for WechatOa {
    fn from(context: Arc<WechatContext>) -> Self {
        Self { context }
    }
}
