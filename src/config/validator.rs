//! Configuration validation.
//!
//! Collects every problem in one pass; the first error is reported and
//! the warnings are returned for display.

use crate::error::{ConfigError, EcsPlanError, Result};
use crate::tools::{ToolName, ToolRegistry};
use std::collections::HashSet;
use tracing::debug;

use super::spec::{LOG_LEVELS, ServerConfig};

/// Validator for server configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all problems found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ValidationResult {
    /// Returns true if no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.into(),
            message: message.into(),
        });
    }
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a server configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error found, if any.
    pub fn validate(&self, config: &ServerConfig) -> Result<ValidationResult> {
        let result = self.check(config);

        if let Some(first_error) = result.errors.first() {
            return Err(EcsPlanError::Config(ConfigError::validation(
                first_error.field.clone(),
                first_error.message.clone(),
            )));
        }

        debug!("Configuration validation passed");
        Ok(result)
    }

    /// Runs every check and returns all errors and warnings.
    #[must_use]
    pub fn check(&self, config: &ServerConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_logging(config, &mut result);
        let disabled = Self::validate_tools(config, &mut result);

        let builtins = ToolRegistry::with_builtin_tools();
        if !builtins.is_empty() && builtins.names().iter().all(|n| disabled.contains(*n)) {
            result
                .warnings
                .push(String::from("Every built-in tool is disabled; the server will list no tools"));
        }

        result
    }

    fn validate_server(config: &ServerConfig, result: &mut ValidationResult) {
        let name = &config.server.name;
        if name.is_empty() {
            result.error("server.name", "Server name cannot be empty");
        } else if name.chars().any(char::is_whitespace) {
            result.error(
                "server.name",
                format!("Server name '{name}' must not contain whitespace"),
            );
        }
    }

    fn validate_logging(config: &ServerConfig, result: &mut ValidationResult) {
        let level = &config.logging.level;
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.error(
                "logging.level",
                format!(
                    "Unknown log level '{level}'. Expected one of: {}",
                    LOG_LEVELS.join(", ")
                ),
            );
        }
    }

    /// Returns the well-formed disabled names.
    fn validate_tools(config: &ServerConfig, result: &mut ValidationResult) -> HashSet<ToolName> {
        let mut seen = HashSet::new();

        for (i, raw) in config.tools.disabled.iter().enumerate() {
            match ToolName::parse(raw) {
                Ok(name) => {
                    if !seen.insert(name) {
                        result
                            .warnings
                            .push(format!("Tool '{raw}' is disabled more than once"));
                    }
                }
                Err(e) => result.error(format!("tools.disabled[{i}]"), e.to_string()),
            }
        }

        seen
    }
}
