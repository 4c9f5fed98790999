//! Image references exchanged with collaborators: remote URLs or inline data.

use crate::error::ValidationError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded image bytes with their MIME type
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl InlineImage {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(data_url: &str) -> Result<Self, ValidationError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| ValidationError::InvalidImage("not a data URL".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ValidationError::InvalidImage("missing data URL payload".to_string()))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| ValidationError::InvalidImage("data URL is not base64".to_string()))?;
        let mime = if mime.is_empty() { "image/png" } else { mime };
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ValidationError::InvalidImage(format!("invalid base64: {}", e)))?;
        if bytes.is_empty() {
            return Err(ValidationError::InvalidImage("empty image".to_string()));
        }
        Ok(Self::new(mime, bytes))
    }

    pub fn from_base64(mime: impl Into<String>, b64: &str) -> Result<Self, ValidationError> {
        let bytes = STANDARD
            .decode(b64.trim())
            .map_err(|e| ValidationError::InvalidImage(format!("invalid base64: {}", e)))?;
        Ok(Self::new(mime, bytes))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// File extension derived from the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Displayable image reference: a remote URL or embedded image data.
///
/// Serialized as a single string (the URL, or a base64 data URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ImageRef {
    Url(String),
    Inline(InlineImage),
}

impl ImageRef {
    pub fn as_inline(&self) -> Option<&InlineImage> {
        match self {
            ImageRef::Inline(image) => Some(image),
            ImageRef::Url(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            ImageRef::Url(url) => Some(url),
            ImageRef::Inline(_) => None,
        }
    }

    /// Short description for logs; never the payload.
    pub fn describe(&self) -> String {
        match self {
            ImageRef::Url(url) => format!("url:{}", url),
            ImageRef::Inline(image) => format!("inline:{}:{}b", image.mime, image.bytes.len()),
        }
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        match image {
            ImageRef::Url(url) => url,
            ImageRef::Inline(image) => image.to_data_url(),
        }
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.starts_with("data:") {
            InlineImage::from_data_url(&value).map(ImageRef::Inline)
        } else if value.trim().is_empty() {
            Err(ValidationError::InvalidImage("empty image reference".to_string()))
        } else {
            Ok(ImageRef::Url(value))
        }
    }
}
