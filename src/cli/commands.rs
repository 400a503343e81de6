//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::{ConfigParser, ServerConfig, load_config};
use crate::error::{EcsPlanError, Result};

/// ecsplan - Namespaced deployment-planning tools.
#[derive(Parser, Debug)]
#[command(name = "ecsplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "ECSPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a template configuration file.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Plan a service update.
    Plan {
        /// Service to update.
        service: String,

        /// Image reference to deploy.
        image: String,

        /// Response verbosity. Anything other than "concise" is detailed.
        #[arg(short, long, default_value = "concise")]
        response_format: String,
    },

    /// Call a registered tool with JSON arguments.
    Call {
        /// Namespaced tool name, e.g. aws.ecs_plan.
        tool: String,

        /// JSON object of arguments.
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// List registered tools.
    Tools,

    /// Serve the tools over stdin/stdout.
    Serve,
}

/// How a command depends on the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUsage {
    /// The command never reads the file.
    Ignored,
    /// The command falls back to defaults if the file cannot be loaded.
    BestEffort,
    /// The command fails if the file cannot be loaded.
    Required,
}

impl Commands {
    /// Returns how this command depends on the configuration file.
    #[must_use]
    pub const fn config_usage(&self) -> ConfigUsage {
        match self {
            Self::Init { .. } => ConfigUsage::Ignored,
            Self::Plan { .. } => ConfigUsage::BestEffort,
            Self::Validate { .. } | Self::Call { .. } | Self::Tools | Self::Serve => {
                ConfigUsage::Required
            }
        }
    }
}

/// Configuration resolved for one invocation.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Effective configuration.
    pub config: ServerConfig,
    /// File the configuration came from, if any.
    pub path: Option<PathBuf>,
    /// Why the defaults were used in place of the file, if they were.
    pub fallback: Option<EcsPlanError>,
}

impl ResolvedConfig {
    fn defaults(fallback: Option<EcsPlanError>) -> Self {
        let mut config = ServerConfig::default();
        ConfigParser::apply_env_overrides(&mut config);
        Self {
            config,
            path: None,
            fallback,
        }
    }
}

impl Cli {
    /// Loads the configuration the selected command needs.
    ///
    /// Environment overrides apply even when the file is not read.
    ///
    /// # Errors
    ///
    /// Returns an error if the command requires the configuration and it
    /// cannot be loaded.
    pub fn resolve_config(&self) -> Result<ResolvedConfig> {
        match self.command.config_usage() {
            ConfigUsage::Ignored => {
                debug!("Command does not read the configuration file");
                Ok(ResolvedConfig::defaults(None))
            }
            ConfigUsage::BestEffort => match load_config(self.config.as_deref()) {
                Ok((config, path)) => Ok(ResolvedConfig {
                    config,
                    path,
                    fallback: None,
                }),
                Err(e) => Ok(ResolvedConfig::defaults(Some(e))),
            },
            ConfigUsage::Required => {
                let (config, path) = load_config(self.config.as_deref())?;
                Ok(ResolvedConfig {
                    config,
                    path,
                    fallback: None,
                })
            }
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
