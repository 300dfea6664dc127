//! Custom Menu API
//!
//! Create, query and delete the account's custom menu, plus conditional
//! (personalized) menus matched against user attributes.
//!
//! ## Example
//!
//! ```ignore
//! use wechat_oa_sdk::api::menu::MenuButton;
//!
//! let buttons = vec![
//!     MenuButton::click("今日歌曲", "V1001_TODAY_MUSIC"),
//!     MenuButton::parent("菜单", vec![MenuButton::view("搜索", "https://www.soso.com/")]),
//! ];
//! wechat.create_menu(buttons).await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::gateway::Params;

/// One menu button; leaf buttons carry a `type`, parents carry `sub_button`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuButton {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub button_type: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagepath: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_button: Vec<MenuButton>,
}

impl MenuButton {
    /// A `click` button that pushes `key` to the account's event handler.
    pub fn click(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            button_type: Some("click".to_string()),
            name: name.into(),
            key: Some(key.into()),
            ..Default::default()
        }
    }

    /// A `view` button that opens `url`.
    pub fn view(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            button_type: Some("view".to_string()),
            name: name.into(),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// A `miniprogram` button; `url` is the fallback for old clients.
    pub fn mini_program(
        name: impl Into<String>,
        appid: impl Into<String>,
        pagepath: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            button_type: Some("miniprogram".to_string()),
            name: name.into(),
            appid: Some(appid.into()),
            pagepath: Some(pagepath.into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// A parent button grouping up to five sub-buttons.
    pub fn parent(name: impl Into<String>, sub_button: Vec<MenuButton>) -> Self {
        Self {
            name: name.into(),
            sub_button,
            ..Default::default()
        }
    }
}

/// Conditions a conditional menu is matched against. Unset fields match all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_platform_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Custom Menu API
pub struct MenuApi {
    context: Arc<WechatContext>,
}

impl MenuApi {
    /// Create a new MenuApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    fn url(&self, path: &str) -> String {
        self.context.client().api_url(path)
    }

    /// Replace the custom menu
    ///
    /// POST /cgi-bin/menu/create
    pub async fn create_menu(&self, buttons: Vec<MenuButton>) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(&self.url("/cgi-bin/menu/create"), json!({ "button": buttons }))
            .await?;
        Ok(())
    }

    /// Query the current menu configuration, conditional menus included
    ///
    /// GET /cgi-bin/menu/get
    pub async fn get_menu(&self) -> Result<Value, WechatError> {
        self.context
            .gateway
            .get(&self.url("/cgi-bin/menu/get"), Params::none())
            .await?
            .into_structured()
    }

    /// Delete the custom menu and every conditional menu
    ///
    /// GET /cgi-bin/menu/delete
    pub async fn delete_menu(&self) -> Result<(), WechatError> {
        self.context
            .gateway
            .get(&self.url("/cgi-bin/menu/delete"), Params::none())
            .await?;
        Ok(())
    }

    /// Create a conditional menu, returning its `menuid`
    ///
    /// POST /cgi-bin/menu/addconditional
    pub async fn add_conditional_menu(
        &self,
        buttons: Vec<MenuButton>,
        match_rule: MatchRule,
    ) -> Result<String, WechatError> {
        let menuid: Value = self
            .context
            .gateway
            .post_json(
                &self.url("/cgi-bin/menu/addconditional"),
                json!({ "button": buttons, "matchrule": match_rule }),
            )
            .await?
            .field("menuid")?;

        // The platform has answered with both numeric and string ids.
        Ok(match menuid {
            Value::String(id) => id,
            other => other.to_string(),
        })
    }

    /// Delete a conditional menu
    ///
    /// POST /cgi-bin/menu/delconditional
    pub async fn delete_conditional_menu(&self, menu_id: &str) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/menu/delconditional"),
                json!({ "menuid": menu_id }),
            )
            .await?;
        Ok(())
    }

    /// Resolve which menu a user would see
    ///
    /// POST /cgi-bin/menu/trymatch
    ///
    /// # Arguments
    /// * `user_id` - The user's OpenID or WeChat ID
    pub async fn try_match_menu(&self, user_id: &str) -> Result<Value, WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/menu/trymatch"),
                json!({ "user_id": user_id }),
            )
            .await?
            .into_structured()
    }
}

impl WechatApi for MenuApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }
}
