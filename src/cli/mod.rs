//! CLI module for the ecsplan tool server.
//!
//! This module provides the command-line interface for planning updates,
//! inspecting tools and running the stdio server.

mod commands;
mod output;

pub use commands::{Cli, Commands, ConfigUsage, OutputFormat, ResolvedConfig};
pub use output::OutputFormatter;
