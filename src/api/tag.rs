//! User Tag Management API
//!
//! An account may define up to 100 tags and attach up to 20 tags to a user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::gateway::Params;

/// A user tag
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    /// Number of users carrying the tag (only present in tag listings)
    #[serde(default)]
    pub count: Option<i64>,
}

/// One page of users carrying a tag
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagUsersResponse {
    /// Users in this page
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub data: OpenIdList,
    /// Pass back as `next_openid` to fetch the next page; empty at the end
    #[serde(default)]
    pub next_openid: String,
}

/// `{"openid": [...]}` wrapper used by user and tag listings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OpenIdList {
    #[serde(default)]
    pub openid: Vec<String>,
}

/// User Tag Management API
pub struct TagApi {
    context: Arc<WechatContext>,
}

impl TagApi {
    /// Create a new TagApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    fn url(&self, path: &str) -> String {
        self.context.client().api_url(path)
    }

    /// Create a tag
    ///
    /// POST /cgi-bin/tags/create
    pub async fn create_tag(&self, name: &str) -> Result<Tag, WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/create"),
                json!({ "tag": { "name": name } }),
            )
            .await?
            .field("tag")
    }

    /// List every tag of the account
    ///
    /// GET /cgi-bin/tags/get
    pub async fn list_tags(&self) -> Result<Vec<Tag>, WechatError> {
        self.context
            .gateway
            .get(&self.url("/cgi-bin/tags/get"), Params::none())
            .await?
            .field("tags")
    }

    /// Rename a tag
    ///
    /// POST /cgi-bin/tags/update
    pub async fn update_tag(&self, tag_id: i64, name: &str) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/update"),
                json!({ "tag": { "id": tag_id, "name": name } }),
            )
            .await?;
        Ok(())
    }

    /// Delete a tag
    ///
    /// POST /cgi-bin/tags/delete
    pub async fn delete_tag(&self, tag_id: i64) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/delete"),
                json!({ "tag": { "id": tag_id } }),
            )
            .await?;
        Ok(())
    }

    /// List users carrying a tag, up to 10000 per page
    ///
    /// POST /cgi-bin/user/tag/get
    pub async fn get_tag_users(
        &self,
        tag_id: i64,
        next_openid: Option<&str>,
    ) -> Result<TagUsersResponse, WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/user/tag/get"),
                json!({ "tagid": tag_id, "next_openid": next_openid }),
            )
            .await?
            .decode()
    }

    /// Attach a tag to up to 50 users
    ///
    /// POST /cgi-bin/tags/members/batchtagging
    pub async fn tag_users(&self, openids: &[&str], tag_id: i64) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/members/batchtagging"),
                json!({ "openid_list": openids, "tagid": tag_id }),
            )
            .await?;
        Ok(())
    }

    /// Detach a tag from up to 50 users
    ///
    /// POST /cgi-bin/tags/members/batchuntagging
    pub async fn untag_users(&self, openids: &[&str], tag_id: i64) -> Result<(), WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/members/batchuntagging"),
                json!({ "openid_list": openids, "tagid": tag_id }),
            )
            .await?;
        Ok(())
    }

    /// Tag ids attached to a user
    ///
    /// POST /cgi-bin/tags/getidlist
    pub async fn get_user_tags(&self, openid: &str) -> Result<Vec<i64>, WechatError> {
        self.context
            .gateway
            .post_json(
                &self.url("/cgi-bin/tags/getidlist"),
                json!({ "openid": openid }),
            )
            .await?
            .field("tagid_list")
    }
}

impl WechatApi for TagApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{create_test_context, mount_token};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_tag() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/tags/create"))
            .and(query_param("access_token", "T1"))
            .and(body_json(json!({"tag": {"name": "广东"}})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tag": {"id": 134, "name": "广东"}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = TagApi::new(create_test_context(&mock_server.uri()));
        let tag = api.create_tag("广东").await.unwrap();
        assert_eq!(tag.id, 134);
        assert_eq!(tag.name, "广东");
        assert_eq!(tag.count, None);
    }

    #[tokio::test]
    async fn test_list_tags() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/tags/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tags": [
                    {"id": 1, "name": "每天一罐可乐星人", "count": 0},
                    {"id": 2, "name": "星标组", "count": 0}
                ]
            })))
            .mount(&mock_server)
            .await;

        let api = TagApi::new(create_test_context(&mock_server.uri()));
        let tags = api.list_tags().await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].name, "星标组");
        assert_eq!(tags[1].count, Some(0));
    }

    #[tokio::test]
    async fn test_get_tag_users_first_page_sends_null_cursor() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/user/tag/get"))
            .and(body_json(json!({"tagid": 134, "next_openid": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "data": {"openid": ["ocYxcuAEy30bX0NXmGn4ypqx3tI0", "ocYxcuBt0mRugKZ7tGAHPnUaOW7Y"]},
                "next_openid": "ocYxcuBt0mRugKZ7tGAHPnUaOW7Y"
            })))
            .mount(&mock_server)
            .await;

        let api = TagApi::new(create_test_context(&mock_server.uri()));
        let page = api.get_tag_users(134, None).await.unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.data.openid.len(), 2);
        assert_eq!(page.next_openid, "ocYxcuBt0mRugKZ7tGAHPnUaOW7Y");
    }

    #[tokio::test]
    async fn test_tag_users() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/tags/members/batchtagging"))
            .and(body_json(json!({"openid_list": ["o1", "o2"], "tagid": 134})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"errcode": 0, "errmsg": "ok"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = TagApi::new(create_test_context(&mock_server.uri()));
        api.tag_users(&["o1", "o2"], 134).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_user_tags() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/tags/getidlist"))
            .and(body_json(json!({"openid": "o1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tagid_list": [134, 2]})))
            .mount(&mock_server)
            .await;

        let api = TagApi::new(create_test_context(&mock_server.uri()));
        assert_eq!(api.get_user_tags("o1").await.unwrap(), vec![134, 2]);
    }

    #[tokio::test]
    async fn test_delete_tag_error() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/tags/delete"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 45058,
                "errmsg": "can't modify sys tag"
            })))
            .mount(&mock_server)
            .await;

        let api = TagApi::new(create_test_context(&mock_server.uri()));
        let err = api.delete_tag(2).await.unwrap_err();
        assert_eq!(err.api_code(), Some(45058));
    }
}
