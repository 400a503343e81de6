//! Error types for the ecsplan tool server.
//!
//! Errors are layered the same way the server is: configuration problems,
//! tool registry and tool argument problems, then the I/O and serialization
//! failures of the transport around them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ecsplan.
#[derive(Debug, Error)]
pub enum EcsPlanError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool registry and tool invocation errors.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// JSON serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The MCP session failed to start or ended abnormally.
    #[error("Server error: {0}")]
    Server(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Tool registry and invocation errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// The requested tool name.
        name: String,
    },

    /// A tool name is not of the form `namespace.name`.
    #[error("Invalid tool name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// A tool with the same name is already registered.
    #[error("Tool already registered: {name}")]
    DuplicateTool {
        /// The duplicated name.
        name: String,
    },

    /// The arguments could not be decoded for the tool.
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// Tool that rejected the arguments.
        tool: String,
        /// Decoder message.
        message: String,
    },
}

impl EcsPlanError {
    /// Creates an internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates a server error with the given message.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    /// Returns true if the error was caused by the caller's input rather
    /// than by the server itself.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Tool(_))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ToolError {
    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(tool: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.to_string(),
        }
    }

    /// Creates an invalid name error.
    #[must_use]
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for ecsplan operations.
pub type Result<T> = std::result::Result<T, EcsPlanError>;
