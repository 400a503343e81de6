//! Configuration module for the ecsplan tool server.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `ecsplan.yaml`
//! - `.env` loading and `ECSPLAN_*` environment overrides
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{
    ConfigParser, DEFAULT_CONFIG_FILES, find_config_file, load_config, user_config_file,
};
pub use spec::{LOG_LEVELS, LogFormat, LoggingConfig, ServerConfig, ServerSection, ToolsConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
