//! Configuration parser for loading and merging configuration files.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, EcsPlanError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::ServerConfig;

/// Configuration parser for loading server configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving the `.env` file.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ServerConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(EcsPlanError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            EcsPlanError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ServerConfig> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            return Ok(ServerConfig::default());
        }

        let config: ServerConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            EcsPlanError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!("Successfully parsed configuration for server: {}", config.server.name);
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Environment variables are checked in the format:
    /// `ECSPLAN_<SECTION>_<KEY>` (e.g., `ECSPLAN_LOG_LEVEL`)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<ServerConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(config: &mut ServerConfig) {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok());
    }

    /// Applies overrides using `lookup` to read variables.
    pub fn apply_overrides_from<F>(config: &mut ServerConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("ECSPLAN_SERVER_NAME") {
            debug!("Overriding server.name from environment");
            config.server.name = name;
        }

        if let Some(level) = lookup("ECSPLAN_LOG_LEVEL") {
            debug!("Overriding logging.level from environment");
            config.logging.level = level.to_ascii_lowercase();
        }

        if let Some(format) = lookup("ECSPLAN_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => {
                    debug!("Overriding logging.format from environment");
                    config.logging.format = format;
                }
                Err(e) => debug!("Ignoring ECSPLAN_LOG_FORMAT: {e}"),
            }
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                EcsPlanError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["ecsplan.yaml", "ecsplan.yml", ".ecsplan.yaml"];

/// Finds the configuration file in `start_dir` or its parents, then in the
/// user configuration directory.
///
/// Returns `None` when no file exists; the server then runs on defaults.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    user_config_file().filter(|path| path.exists())
}

/// Path of the per-user configuration file, if the platform has one.
#[must_use]
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ecsplan").join("config.yaml"))
}

/// Resolves and loads the configuration.
///
/// An explicit path must exist. Without one, the discovered file is used,
/// or the defaults if none is found. Environment overrides apply in every
/// case.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<(ServerConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file("."),
    };

    let base = path
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let parser = ConfigParser::new().with_base_path(base);
    parser.load_dotenv()?;

    let config = match path.as_deref() {
        Some(path) => parser.load_with_env(path)?,
        None => {
            debug!("No configuration file found, using defaults");
            let mut config = ServerConfig::default();
            ConfigParser::apply_env_overrides(&mut config);
            config
        }
    };

    Ok((config, path))
}
