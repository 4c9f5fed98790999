//! Command-line interface definition.

use crate::config::{ConfigLoader, QuizConfig};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stickerquiz")]
#[command(about = "Sticker quiz service: wizard sessions, sticker generation and delivery")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path (layered over the global config file)
    #[arg(long, global = true, env = "STICKERQUIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true, env = "STICKERQUIZ_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Override the listening port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load and validate configuration, then exit
    CheckConfig,
    /// Print the question catalog as JSON
    Questions,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve { port: None })
    }

    /// Load configuration and apply command-line overrides.
    pub fn load_config(&self) -> Result<QuizConfig, ApiError> {
        let mut config = ConfigLoader::load(self.config.as_deref())?;
        if let Commands::Serve { port: Some(port) } = self.command() {
            config.server.port = port;
        }
        self.apply_logging_overrides(&mut config.logging);
        Ok(config)
    }

    /// Flags win over the config file.
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if self.verbose {
            logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
    }
}
