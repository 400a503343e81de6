//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde_json::Value;
use std::fmt::Write;
use std::path::Path;
use tabled::{Table, Tabled};

use crate::config::{ServerConfig, ValidationResult};
use crate::planner::PlanResponse;
use crate::tools::ToolDefinition;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Plan field row for table display.
#[derive(Tabled)]
struct PlanFieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Tool row for table display.
#[derive(Tabled)]
struct ToolRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Read-only")]
    read_only: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a plan response for display.
    #[must_use]
    pub fn format_plan_response(&self, response: &PlanResponse) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(response).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_response_text(response),
        }
    }

    fn format_plan_response_text(response: &PlanResponse) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "{} {}", "✓".green(), response.summary());

        if let Some(plan) = response.plan() {
            let rows = vec![
                PlanFieldRow {
                    field: "Service",
                    value: plan.service.clone(),
                },
                PlanFieldRow {
                    field: "Image",
                    value: plan.image.clone(),
                },
                PlanFieldRow {
                    field: "Checks",
                    value: plan.checks.join(", "),
                },
                PlanFieldRow {
                    field: "Cluster",
                    value: plan.ids.cluster.clone(),
                },
                PlanFieldRow {
                    field: "Task definition",
                    value: plan.ids.taskdef.clone(),
                },
            ];
            output.push('\n');
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        output.push_str("\nNext steps:\n");
        for step in response.next_steps() {
            let _ = writeln!(output, "   - {step}");
        }

        output
    }

    /// Formats arbitrary tool output.
    ///
    /// Tool output is JSON in both formats; text output is pretty-printed.
    #[must_use]
    pub fn format_tool_output(&self, output: &Value) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(output).unwrap_or_default(),
            OutputFormat::Text => serde_json::to_string_pretty(output).unwrap_or_default(),
        }
    }

    /// Formats tool definitions for display.
    #[must_use]
    pub fn format_tools(&self, tools: &[ToolDefinition]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(tools).unwrap_or_default(),
            OutputFormat::Text => Self::format_tools_text(tools),
        }
    }

    fn format_tools_text(tools: &[ToolDefinition]) -> String {
        if tools.is_empty() {
            return format!("{} No tools registered.\n", "⚠".yellow());
        }

        let rows: Vec<ToolRow> = tools
            .iter()
            .map(|t| ToolRow {
                name: t.name.to_string(),
                title: t.title.clone().unwrap_or_default(),
                read_only: if t.annotations.as_ref().and_then(|a| a.read_only_hint) == Some(true) {
                    "yes"
                } else {
                    "no"
                }
                .to_string(),
                description: Self::truncate(t.description.as_deref().unwrap_or_default(), 60),
            })
            .collect();

        let mut output = Table::new(rows).to_string();
        let _ = write!(output, "\n\n{} tool(s) registered\n", tools.len());
        output
    }

    /// Formats a validation summary.
    #[must_use]
    pub fn format_validation(
        &self,
        config: &ServerConfig,
        source: Option<&Path>,
        result: &ValidationResult,
        show_warnings: bool,
    ) -> String {
        if self.format == OutputFormat::Json {
            let summary = serde_json::json!({
                "valid": result.is_valid(),
                "source": source.map(|p| p.display().to_string()),
                "config": config,
                "warnings": result.warnings,
            });
            return serde_json::to_string_pretty(&summary).unwrap_or_default();
        }

        let mut output = String::new();
        let _ = writeln!(output, "{} Configuration is valid!", "✓".green());

        if show_warnings && !result.warnings.is_empty() {
            output.push_str("\nWarnings:\n");
            for warning in &result.warnings {
                let _ = writeln!(output, "  {} {warning}", "⚠".yellow());
            }
        }

        output.push_str("\nConfiguration summary:\n");
        let _ = writeln!(
            output,
            "  Source: {}",
            source.map_or_else(|| String::from("(defaults)"), |p| p.display().to_string())
        );
        let _ = writeln!(output, "  Server: {}", config.server.name);
        let _ = writeln!(
            output,
            "  Logging: {} ({:?})",
            config.logging.level, config.logging.format
        );
        let _ = writeln!(output, "  Disabled tools: {}", config.tools.disabled.len());
        output
    }

    /// Truncates a string to the specified length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }
}
