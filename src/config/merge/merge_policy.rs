//! Merge rules: defaults and override order.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Only keys other layers commonly override are seeded here; everything else
/// falls back to the serde defaults on `QuizConfig`.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("server.static_dir", "dist")?
        .set_default("providers.image.primary_model", "gpt-image-1")?
        .set_default("providers.image.secondary_model", "dall-e-3")?
        .set_default("storage.bucket", "stickers")
}
