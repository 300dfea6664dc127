//! User Management API
//!
//! Follower listing, profile lookup, remarks and the blacklist.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::tag::OpenIdList;
use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::gateway::Params;

/// Default profile language
pub const DEFAULT_LANG: &str = "zh_CN";

/// One page of followers (or blacklisted users)
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserListResponse {
    /// Total number of users
    #[serde(default)]
    pub total: i64,
    /// Users in this page
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub data: OpenIdList,
    /// Cursor for the next page; empty at the end
    #[serde(default)]
    pub next_openid: String,
}

/// Follower profile
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserInfo {
    /// 0 when the user does not follow the account; other fields are then absent
    #[serde(default)]
    pub subscribe: i32,
    #[serde(default)]
    pub openid: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub sex: Option<i32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub headimgurl: Option<String>,
    #[serde(default)]
    pub subscribe_time: Option<i64>,
    #[serde(default)]
    pub unionid: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub groupid: Option<i64>,
    #[serde(default)]
    pub tagid_list: Vec<i64>,
    #[serde(default)]
    pub subscribe_scene: Option<String>,
    #[serde(default)]
    pub qr_scene: Option<i64>,
    #[serde(default)]
    pub qr_scene_str: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserListItem<'a> {
    openid: &'a str,
    lang: &'a str,
}

/// User Management API
pub struct UserApi {
    context: Arc<WechatContext>,
}

impl UserApi {
    /// Create a new UserApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    fn url(&self, path: &str) -> String {
        self.context.client().api_url(path)
    }

    /// List followers, 10000 per page
    ///
    /// GET /cgi-bin/user/get
    pub async fn list_users(
        &self,
        next_openid: Option<&str>,
    ) -> Result<UserListResponse, WechatError> {
        self.context
            .gateway
            .get(
                &self.url("/cgi-bin/user/get"),
                Params::form([("next_openid", next_openid)]),
            )
            .await?
            .decode()
    }

    /// Fetch one follower's profile
    ///
    /// GET /cgi-bin/user/info
    ///
    /// # Arguments
    /// * `openid` - The follower's OpenID
    /// * `lang` - Profile language (`zh_CN`, `zh_TW`, `en`)
    pub async fn get_user(&self, openid: &str, lang: &str) -> Result<UserInfo, WechatError> {
        self.context
            .gateway
            .get(
                &self.url("/cgi-bin/user/info"),
                Params::form([("openid", Some(openid)), ("lang", Some(lang))]),
            )
            .await?
            .decode()
    }

    /// Fetch up to 100 profiles in one call
    ///
    /// POST /cgi-bin/user/info/batchget
    pub async fn get_users(
        &self,
        openids: &[&str],
        lang: &str,
    ) -> Result<Vec<UserInfo>, WechatError> {
        let user_list: Vec<UserListItem<'_>> = openids
            .iter()
            .map(|&openid| UserListItem { openid, lang })
            .collect();

        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/user/info/batchget"),
                json!({ "user_list": user_list }),
            )
            .await?
            .field("user_info_list")
    }

    /// Set the account-side remark name of a follower
    ///
    /// POST /cgi-bin/user/info/updateremark
    pub async fn remark_user(&self, openid: &str, remark: &str) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/user/info/updateremark"),
                json!({ "openid": openid, "remark": remark }),
            )
            .await?;
        Ok(())
    }

    /// List blacklisted users, 10000 per page
    ///
    /// POST /cgi-bin/tags/members/getblacklist
    pub async fn get_blacklist(
        &self,
        begin_openid: Option<&str>,
    ) -> Result<UserListResponse, WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/members/getblacklist"),
                json!({ "begin_openid": begin_openid }),
            )
            .await?
            .decode()
    }

    /// Blacklist up to 20 users
    ///
    /// POST /cgi-bin/tags/members/batchblacklist
    ///
    /// The body key is `opened_list`, where the platform documents
    /// `openid_list`. Unverified against the live API.
    pub async fn batch_blacklist(&self, openids: &[&str]) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/members/batchblacklist"),
                json!({ "opened_list": openids }),
            )
            .await?;
        Ok(())
    }

    /// Remove up to 20 users from the blacklist
    ///
    /// POST /cgi-bin/tags/members/batchunblacklist
    ///
    /// Same `opened_list` caveat as [`batch_blacklist`](Self::batch_blacklist).
    pub async fn batch_unblacklist(&self, openids: &[&str]) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/members/batchunblacklist"),
                json!({ "opened_list": openids }),
            )
            .await?;
        Ok(())
    }
}

impl WechatApi for UserApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }
}
