//! JS-SDK API
//!
//! Issues the `jsapi_ticket` and signs the `wx.config` payload web pages need
//! before calling JS-SDK interfaces.
//!
//! The ticket is cached like the access token, under its own key, and is
//! fetched through the gateway so a rejected access token during issuance is
//! handled the same way as for any endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::gateway::Params;
use crate::token::CredentialKind;

const NONCE_LEN: usize = 10;

#[derive(Debug, Deserialize)]
struct TicketResponse {
    ticket: String,
    expires_in: i64,
}

/// Signed configuration for `wx.config(...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsApiConfig {
    pub debug: bool,
    pub app_id: String,
    pub nonce_str: String,
    pub timestamp: i64,
    pub signature: String,
    pub js_api_list: Vec<String>,
}

impl JsApiConfig {
    /// JSON text ready to embed in a page.
    pub fn to_json(&self) -> Result<String, WechatError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// SHA-1 signature over the ticket, nonce, timestamp and page URL.
///
/// `url` is the full page URL without the `#` fragment.
pub fn sign(jsapi_ticket: &str, nonce_str: &str, timestamp: i64, url: &str) -> String {
    let plain = format!(
        "jsapi_ticket={}&noncestr={}&timestamp={}&url={}",
        jsapi_ticket, nonce_str, timestamp, url
    );
    let mut hasher = Sha1::new();
    hasher.update(plain.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn nonce() -> String {
    (0..NONCE_LEN).map(|_| fastrand::alphanumeric()).collect()
}

/// JS-SDK API
pub struct JsSdkApi {
    context: Arc<WechatContext>,
}

impl JsSdkApi {
    /// Create a new JsSdkApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// Return a usable `jsapi_ticket`, issuing one on a cache miss
    ///
    /// POST /cgi-bin/ticket/getticket?access_token=ACCESS_TOKEN&type=jsapi
    pub async fn get_jsapi_ticket(&self) -> Result<String, WechatError> {
        let token_manager = self.context.token_manager();
        if let Some(ticket) = token_manager
            .cached_credential(CredentialKind::JsApiTicket)
            .await?
        {
            return Ok(ticket.value().to_string());
        }

        let url = format!(
            "{}?type=jsapi",
            self.context.client().api_url("/cgi-bin/ticket/getticket")
        );
        let response: TicketResponse = self
            .context
            .gateway
            .post(&url, Params::none())
            .await?
            .decode()?;
        log::debug!(
            "[WechatOa] issued jsapi ticket for {} (expires_in={}s)",
            token_manager.appid(),
            response.expires_in
        );

        let ticket = token_manager
            .store_credential(
                CredentialKind::JsApiTicket,
                response.ticket,
                response.expires_in,
            )
            .await?;
        Ok(ticket.value().to_string())
    }

    /// Drop the cached `jsapi_ticket`
    pub async fn invalidate_jsapi_ticket(&self) -> Result<(), WechatError> {
        self.context.token_manager().invalidate_ticket().await
    }

    /// Build a signed `wx.config` payload for the page at `url`
    ///
    /// # Arguments
    /// * `apis` - JS interfaces the page will call, e.g. `["chooseImage"]`
    /// * `debug` - Turn on the JS-SDK debug mode
    /// * `url` - Full URL of the calling page, without the fragment
    pub async fn jsapi_config(
        &self,
        apis: &[&str],
        debug: bool,
        url: &str,
    ) -> Result<JsApiConfig, WechatError> {
        let ticket = self.get_jsapi_ticket().await?;
        let nonce_str = nonce();
        let timestamp = chrono::Utc::now().timestamp();

        Ok(JsApiConfig {
            debug,
            app_id: self.context.client().appid().to_string(),
            signature: sign(&ticket, &nonce_str, timestamp, url),
            nonce_str,
            timestamp,
            js_api_list: apis.iter().map(|api| api.to_string()).collect(),
        })
    }
}

impl WechatApi for JsSdkApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }
}
