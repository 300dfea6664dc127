use thiserror::Error;

/// Error code the platform returns when the presented access token was
/// rejected (expired, or replaced by a newer token issued to another consumer).
pub const INVALID_CREDENTIAL: i32 = 40001;

/// WeChat SDK error types
#[derive(Debug, Error)]
pub enum WechatError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WeChat API error (code={code}): {message}")]
    Api { code: i32, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP method {0} is not supported")]
    UnsupportedMethod(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Credential cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WechatError {
    /// Map an upstream `errcode`/`errmsg` pair to a result.
    ///
    /// `0` is success; anything else becomes [`WechatError::Api`].
    pub fn check_api(code: i32, message: &str) -> Result<(), WechatError> {
        if code == 0 {
            Ok(())
        } else {
            Err(WechatError::Api {
                code,
                message: message.to_string(),
            })
        }
    }

    /// Returns the upstream error code, if this is an API error.
    pub fn api_code(&self) -> Option<i32> {
        match self {
            WechatError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the platform rejected the access token (errcode 40001).
    pub fn is_invalid_credential(&self) -> bool {
        self.api_code() == Some(INVALID_CREDENTIAL)
    }
}
