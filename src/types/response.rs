use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::WechatError;

/// Body returned by an authenticated endpoint call.
///
/// JSON object bodies are decoded into [`ApiResponse::Structured`]; anything
/// else (media downloads, plain text) is handed back untouched as
/// [`ApiResponse::Raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Structured(Value),
    Raw(Bytes),
}

impl ApiResponse {
    /// Classify a response body.
    ///
    /// Decoding is only attempted when the body contains a `{`, and only a
    /// JSON object counts as structured.
    pub fn from_body(body: Bytes) -> Self {
        if !body.contains(&b'{') {
            return ApiResponse::Raw(body);
        }
        match serde_json::from_slice::<Value>(&body) {
            Ok(value @ Value::Object(_)) => ApiResponse::Structured(value),
            _ => ApiResponse::Raw(body),
        }
    }

    /// `errcode` carried by a structured body, if any.
    pub fn errcode(&self) -> Option<i64> {
        match self {
            ApiResponse::Structured(value) => value.get("errcode").and_then(Value::as_i64),
            ApiResponse::Raw(_) => None,
        }
    }

    /// `errmsg` carried by a structured body, or an empty string.
    pub fn errmsg(&self) -> &str {
        match self {
            ApiResponse::Structured(value) => value
                .get("errmsg")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            ApiResponse::Raw(_) => "",
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ApiResponse::Structured(_))
    }

    /// Take the structured body, failing if the upstream answered with raw bytes.
    pub fn into_structured(self) -> Result<Value, WechatError> {
        match self {
            ApiResponse::Structured(value) => Ok(value),
            ApiResponse::Raw(body) => Err(WechatError::Decode(format!(
                "expected a JSON object, got {} raw bytes",
                body.len()
            ))),
        }
    }

    /// Deserialize the structured body into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, WechatError> {
        Ok(serde_json::from_value(self.into_structured()?)?)
    }

    /// Extract and deserialize a single top-level field of the structured body.
    pub fn field<T: DeserializeOwned>(self, name: &str) -> Result<T, WechatError> {
        let mut value = self.into_structured()?;
        let field = value
            .get_mut(name)
            .map(Value::take)
            .ok_or_else(|| WechatError::Decode(format!("missing field `{}`", name)))?;
        Ok(serde_json::from_value(field)?)
    }

    /// Body bytes; structured bodies are re-serialized.
    pub fn into_bytes(self) -> Result<Bytes, WechatError> {
        match self {
            ApiResponse::Raw(body) => Ok(body),
            ApiResponse::Structured(value) => Ok(Bytes::from(serde_json::to_vec(&value)?)),
        }
    }
}
