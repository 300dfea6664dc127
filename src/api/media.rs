//! Temporary Media API
//!
//! Upload and download temporary media on the file host. Temporary media is
//! kept for 3 days.
//!
//! ## Supported Media Types
//!
//! - Image (image): jpg, png, gif, bmp; up to 10MB
//! - Voice (voice): amr, mp3; up to 2MB, 60s
//! - Video (video): mp4; up to 10MB
//! - Thumbnail (thumb): jpg; up to 64KB
//!
//! ## Example
//!
//! ```ignore
//! let uploaded = wechat.upload_media(MediaType::Image, "/path/to/file.jpg").await?;
//! let bytes = wechat.get_media(&uploaded.media_id).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use super::{WechatApi, WechatContext};
use crate::error::WechatError;
use crate::gateway::Params;

/// Media type for temporary media upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Voice,
    Video,
    Thumb,
}

impl MediaType {
    /// Get the string representation of the media type
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Voice => "voice",
            MediaType::Video => "video",
            MediaType::Thumb => "thumb",
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = WechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "voice" => Ok(MediaType::Voice),
            "video" => Ok(MediaType::Video),
            "thumb" => Ok(MediaType::Thumb),
            other => Err(WechatError::Config(format!("unknown media type: {}", other))),
        }
    }
}

/// Response from temporary media upload
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize)]
pub struct MediaUploadResponse {
    /// Type of the uploaded media
    #[serde(rename = "type")]
    pub media_type: String,
    /// Identifier for the uploaded media; thumbnails answer with `thumb_media_id`
    #[serde(alias = "thumb_media_id")]
    pub media_id: String,
    /// Unix timestamp when the media was created
    pub created_at: i64,
}

/// Temporary Media API
pub struct MediaApi {
    context: Arc<WechatContext>,
}

impl MediaApi {
    /// Create a new MediaApi instance
    pub fn new(context: Arc<WechatContext>) -> Self {
        Self { context }
    }

    /// Upload a local file as temporary media
    ///
    /// POST /cgi-bin/media/upload?access_token=ACCESS_TOKEN&type=TYPE
    ///
    /// The file is sent as the `media` part of a multipart body.
    ///
    /// # Errors
    /// Returns `WechatError::Io` if the file cannot be read
    pub async fn upload_media(
        &self,
        media_type: MediaType,
        file: impl AsRef<Path>,
    ) -> Result<MediaUploadResponse, WechatError> {
        let url = format!(
            "{}?type={}",
            self.context.client().file_url("/cgi-bin/media/upload"),
            media_type.as_str()
        );

        self.context
            .gateway
            .upload(&url, vec![("media".to_string(), file.as_ref().to_path_buf())])
            .await?
            .decode()
    }

    /// Download temporary media
    ///
    /// GET /cgi-bin/media/get?access_token=ACCESS_TOKEN&media_id=MEDIA_ID
    ///
    /// Returns the file bytes. Video media answers with a JSON body holding a
    /// `video_url`; those bytes are returned as-is.
    pub async fn get_media(&self, media_id: &str) -> Result<Vec<u8>, WechatError> {
        let bytes = self
            .context
            .gateway
            .get(
                &self.context.client().file_url("/cgi-bin/media/get"),
                Params::form([("media_id", Some(media_id))]),
            )
            .await?
            .into_bytes()?;
        Ok(bytes.to_vec())
    }

    /// Download temporary media as standard base64
    pub async fn get_media_base64(&self, media_id: &str) -> Result<String, WechatError> {
        Ok(BASE64.encode(self.get_media(media_id).await?))
    }
}

impl WechatApi for MediaApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }
}
