//! Config loading entry point.

use super::merge::merge_policy;
use super::sources::{env, explicit_file, global_file};
use super::QuizConfig;
use crate::error::ApiError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "STICKERQUIZ_CONFIG";

/// Where each layer comes from. `Default` reads the real environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Global file; `None` skips the layer
    pub global_file: Option<PathBuf>,
    pub explicit_file: Option<PathBuf>,
    /// Replaces the process environment when set
    pub env: Option<HashMap<String, String>>,
}

impl ConfigSources {
    /// Sources for a running process: XDG global file, `explicit` or
    /// `STICKERQUIZ_CONFIG`, and the process environment.
    pub fn from_process(explicit: Option<&Path>) -> Self {
        let explicit_file = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        Self {
            global_file: global_file::global_config_path(),
            explicit_file,
            env: None,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the running process.
    pub fn load(explicit: Option<&Path>) -> Result<QuizConfig, ApiError> {
        Self::load_from_sources(&ConfigSources::from_process(explicit))
    }

    /// Load a single file on top of defaults, ignoring the environment.
    pub fn load_from_file(path: &Path) -> Result<QuizConfig, ApiError> {
        Self::load_from_sources(&ConfigSources {
            global_file: None,
            explicit_file: Some(path.to_path_buf()),
            env: Some(HashMap::new()),
        })
    }

    pub fn load_from_sources(sources: &ConfigSources) -> Result<QuizConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, sources.global_file.as_deref())?;
        let builder = explicit_file::add_to_builder(builder, sources.explicit_file.as_deref())?;
        let builder = env::add_to_builder(builder, sources.env.as_ref())?;

        let config: QuizConfig = builder.build()?.try_deserialize()?;
        debug!(
            port = config.server.port,
            email_capture = config.flow.email_capture,
            storage = config.storage.is_configured(),
            smtp = config.smtp.is_configured(),
            webhook = config.webhook.url.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load and validate, joining every validation problem into one error.
    pub fn load_validated(explicit: Option<&Path>) -> Result<QuizConfig, ApiError> {
        let config = Self::load(explicit)?;
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(config)
    }
}
