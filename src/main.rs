//! ecsplan CLI entrypoint.
//!
//! This is the main entrypoint for the ecsplan command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use ecsplan::cli::{Cli, Commands, OutputFormatter, ResolvedConfig};
use ecsplan::config::{ConfigValidator, LogFormat, LoggingConfig, ServerConfig};
use ecsplan::error::Result;
use ecsplan::planner::{ResponseFormat, format_update_plan};
use ecsplan::server::{ToolServer, serve_stdio};
use ecsplan::tools::ToolRegistry;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is loaded before logging so its level and format apply.
    let ResolvedConfig {
        config,
        path: config_path,
        fallback,
    } = match cli.resolve_config() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose, &config.logging);
    if let Some(e) = fallback {
        warn!("Using default configuration: {e}");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, config, config_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` wins over `--verbose`, which wins over the configured level.
/// Logs always go to stderr; stdout carries command output and protocol
/// messages.
fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(&logging.level)
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Main async entry point.
async fn run(cli: Cli, config: ServerConfig, config_path: Option<PathBuf>) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Validate { warnings } => {
            cmd_validate(&config, config_path.as_deref(), warnings, &formatter)
        }
        Commands::Plan {
            service,
            image,
            response_format,
        } => {
            cmd_plan(&service, &image, &response_format, &formatter);
            Ok(())
        }
        Commands::Call { tool, args } => cmd_call(&config, &tool, &args, &formatter).await,
        Commands::Tools => cmd_tools(&config, &formatter),
        Commands::Serve => cmd_serve(config).await,
    }
}

/// Write a template configuration file.
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    info!("Initializing ecsplan configuration in: {}", path.display());

    let config_path = path.join("ecsplan.yaml");

    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    let config_template = include_str!("../templates/ecsplan.yaml");
    std::fs::write(&config_path, config_template)?;
    eprintln!("Created: {}", config_path.display());

    eprintln!("\nNext steps:");
    eprintln!("  1. Edit ecsplan.yaml to name the server and pick a log level");
    eprintln!("  2. Run 'ecsplan validate' to check your configuration");
    eprintln!("  3. Run 'ecsplan serve' from your MCP client configuration");

    Ok(())
}

/// Validate configuration.
fn cmd_validate(
    config: &ServerConfig,
    config_path: Option<&Path>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let result = ConfigValidator::new().validate(config)?;
    println!(
        "{}",
        formatter.format_validation(config, config_path, &result, show_warnings)
    );
    Ok(())
}

/// Plan a service update.
fn cmd_plan(service: &str, image: &str, response_format: &str, formatter: &OutputFormatter) {
    let response_format = ResponseFormat::from_label(response_format);
    debug!("Planning {service} -> {image} ({response_format})");
    let response = format_update_plan(service, image, response_format);
    println!("{}", formatter.format_plan_response(&response));
}

/// Call a tool through the registry.
async fn cmd_call(
    config: &ServerConfig,
    tool: &str,
    args: &str,
    formatter: &OutputFormatter,
) -> Result<()> {
    let output = ToolRegistry::from_config(config)?
        .call_json(tool, args)
        .await?;
    println!("{}", formatter.format_tool_output(&output));
    Ok(())
}

/// List registered tools.
fn cmd_tools(config: &ServerConfig, formatter: &OutputFormatter) -> Result<()> {
    let registry = ToolRegistry::from_config(config)?;
    println!("{}", formatter.format_tools(&registry.definitions()));
    Ok(())
}

/// Serve tools over stdio.
async fn cmd_serve(config: ServerConfig) -> Result<()> {
    ConfigValidator::new().validate(&config)?;
    let registry = Arc::new(ToolRegistry::from_config(&config)?);
    serve_stdio(ToolServer::from_config(registry, &config)).await?;
    Ok(())
}
