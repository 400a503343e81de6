//! Configuration specification types for the tool server.
//!
//! This module defines the structs that map to the `ecsplan.yaml` file.
//! Every section is optional and falls back to built-in defaults.

use serde::{Deserialize, Serialize};

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server identity reported to clients.
    #[serde(default)]
    pub server: ServerSection,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Tool selection.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Server identity reported in the `initialize` handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSection {
    /// Server name.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Usage instructions sent to clients.
    #[serde(default = "default_instructions")]
    pub instructions: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log line format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Tool selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolsConfig {
    /// Namespaced names of built-in tools not to register.
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            instructions: default_instructions(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

fn default_server_name() -> String {
    String::from("ecsplan")
}

#[allow(clippy::unnecessary_wraps)]
fn default_instructions() -> Option<String> {
    Some(String::from(
        "Use aws.ecs_plan to plan a service update. Responses are concise by default; \
         pass response_format=detailed only when cluster and task definition ids are needed.",
    ))
}

fn default_log_level() -> String {
    String::from("info")
}
