//! Explicit config file source: `--config <path>` or `STICKERQUIZ_CONFIG`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

/// Add the explicitly requested file. Unlike the global file it must exist.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            Ok(builder.add_source(File::from(path).required(true)))
        }
        None => Ok(builder),
    }
}
