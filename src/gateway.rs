//! Authenticated request pipeline
//!
//! Every endpoint call goes through [`Gateway::request`]: attach the access
//! token, send, classify the body, and surface `errcode`s. When the platform
//! rejects the token (errcode 40001) the cached token is dropped and the
//! request is replayed once with a freshly issued one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use http::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::client::WechatClient;
use crate::error::{WechatError, INVALID_CREDENTIAL};
use crate::token::TokenManager;
use crate::types::ApiResponse;

/// Attempts per logical call: the original request plus one replay after a
/// 40001.
const MAX_ATTEMPTS: usize = 2;

/// A local file turned into a multipart part.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

impl FilePart {
    /// Read `path` into a part named `field`.
    ///
    /// The file name comes from the last path component, the MIME type from
    /// the extension.
    pub async fn from_path(field: impl Into<String>, path: &Path) -> Result<Self, WechatError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            field: field.into(),
            file_name,
            mime,
            data,
        })
    }

    fn to_part(&self) -> Result<Part, WechatError> {
        Ok(Part::bytes(self.data.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)?)
    }
}

/// Request parameters together with their transport encoding.
#[derive(Debug, Clone)]
pub enum Params {
    /// Query string for GET, `application/x-www-form-urlencoded` body for POST.
    Form(Vec<(String, String)>),
    /// Raw JSON body. Non-ASCII text is sent as literal UTF-8.
    Json(Value),
    /// `multipart/form-data` body of file parts.
    Multipart(Vec<FilePart>),
}

impl Params {
    pub fn none() -> Self {
        Params::Form(Vec::new())
    }

    /// Form parameters from borrowed pairs; `None` values are left out.
    pub fn form<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        Params::Form(
            pairs
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.to_string())))
                .collect(),
        )
    }
}

/// Encode a JSON body without escaping non-ASCII characters.
pub fn encode_json_body(value: &Value) -> Result<Vec<u8>, WechatError> {
    Ok(serde_json::to_vec(value)?)
}

/// Executes authenticated endpoint calls.
#[derive(Clone)]
pub struct Gateway {
    client: Arc<WechatClient>,
    token_manager: Arc<TokenManager>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("appid", &self.client.appid())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(client: Arc<WechatClient>, token_manager: Arc<TokenManager>) -> Self {
        Self {
            client,
            token_manager,
        }
    }

    pub fn client(&self) -> &WechatClient {
        &self.client
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.token_manager
    }

    /// Execute one logical API call.
    ///
    /// # Arguments
    /// * `url` - Absolute endpoint URL; may already carry query parameters
    /// * `params` - Parameters and their encoding
    /// * `method` - `GET` or `POST`
    ///
    /// # Errors
    /// - `WechatError::UnsupportedMethod` for any other method, before any I/O
    /// - `WechatError::Http` for transport failures and non-2xx status codes
    /// - `WechatError::Api` for a non-zero `errcode`, including a 40001 that
    ///   persists after the single replay
    pub async fn request(
        &self,
        url: &str,
        params: Params,
        method: Method,
    ) -> Result<ApiResponse, WechatError> {
        if method != Method::GET && method != Method::POST {
            return Err(WechatError::UnsupportedMethod(method.to_string()));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self.send_once(url, &params, &method).await?;

            match response.errcode() {
                None | Some(0) => return Ok(response),
                Some(code) if code == i64::from(INVALID_CREDENTIAL) && attempt < MAX_ATTEMPTS => {
                    log::info!(
                        "[WechatOa] access token rejected by {} (errcode {}), refreshing",
                        url,
                        code
                    );
                    self.token_manager.invalidate().await?;
                }
                Some(code) => {
                    return Err(WechatError::Api {
                        code: code.try_into().unwrap_or(i32::MAX),
                        message: response.errmsg().to_string(),
                    });
                }
            }
        }
    }

    /// GET with form-encoded (query string) parameters.
    pub async fn get(&self, url: &str, params: Params) -> Result<ApiResponse, WechatError> {
        self.request(url, params, Method::GET).await
    }

    /// POST with form-encoded parameters.
    pub async fn post(&self, url: &str, params: Params) -> Result<ApiResponse, WechatError> {
        self.request(url, params, Method::POST).await
    }

    /// POST with a JSON body.
    pub async fn post_json(&self, url: &str, body: Value) -> Result<ApiResponse, WechatError> {
        self.request(url, Params::Json(body), Method::POST).await
    }

    /// POST local files as `multipart/form-data`.
    ///
    /// Each `(field, path)` pair becomes one file part.
    pub async fn upload(
        &self,
        url: &str,
        files: Vec<(String, PathBuf)>,
    ) -> Result<ApiResponse, WechatError> {
        let mut parts = Vec::with_capacity(files.len());
        for (field, path) in files {
            parts.push(FilePart::from_path(field, &path).await?);
        }
        self.request(url, Params::Multipart(parts), Method::POST)
            .await
    }

    async fn send_once(
        &self,
        url: &str,
        params: &Params,
        method: &Method,
    ) -> Result<ApiResponse, WechatError> {
        let token = self.token_manager.get_token().await?;
        let url = WechatClient::append_access_token(url, &token);
        let http = self.client.http();

        let builder = match params {
            Params::Form(pairs) if *method == Method::GET => http.get(url).query(pairs),
            Params::Form(pairs) => http.post(url).form(pairs),
            Params::Json(value) => http
                .request(method.clone(), url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(encode_json_body(value)?),
            Params::Multipart(files) => {
                let mut form = Form::new();
                for file in files {
                    form = form.part(file.field.clone(), file.to_part()?);
                }
                http.request(method.clone(), url).multipart(form)
            }
        };

        let response = self.client.send_request(builder.build()?).await?;
        if let Err(e) = response.error_for_status_ref() {
            return Err(e.into());
        }

        Ok(ApiResponse::from_body(response.bytes().await?))
    }
}
