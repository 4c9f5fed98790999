use crate::archetype::Archetype;
use crate::image::ImageRef;
use serde::{Deserialize, Serialize};

/// Which link of the fallback chain produced the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPath {
    Primary,
    Secondary,
    Fallback,
}

impl GenerationPath {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationPath::Primary => "primary",
            GenerationPath::Secondary => "secondary",
            GenerationPath::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image: ImageRef,
    pub archetype: Archetype,
    /// Exact prompt sent to the providers
    pub prompt: String,
    pub path: GenerationPath,
    /// Why a fallback was used; kept for debugging, not shown by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Public URL of an inline image once it has been stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
