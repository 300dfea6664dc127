use serde::{Deserialize, Serialize};

use crate::error::WechatError;

/// Official Account / Mini Program AppID
///
/// Surrounding whitespace is trimmed; the remainder must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Result<Self, WechatError> {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            return Err(WechatError::Config("app id is empty".to_string()));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// AppSecret paired with an [`AppId`]
///
/// `Debug` never prints the secret itself.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppSecret(String);

impl AppSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, WechatError> {
        let secret = secret.into();
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(WechatError::Config("app secret is empty".to_string()));
        }
        Ok(Self(secret.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AppSecret([REDACTED])")
    }
}
