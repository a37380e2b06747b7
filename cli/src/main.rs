//! CLI entrypoint for fnbridge
//!
//! This is the main binary that wires together all layers: configuration,
//! registration and the tool registry.

mod commands;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use commands::{Cli, Command};
use fnbridge_application::{RegistrationReport, ToolExecutorPort};
use fnbridge_domain::tool::entities::{ToolArguments, ToolCall};
use fnbridge_infrastructure::{ConfigLoader, FunctionsConfig, ToolRegistry};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // Tool output goes to stdout; keep logs off it
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_without_file()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    };
    info!(directory = %config.functions_directory.display(), "Loaded configuration");

    match cli.command {
        Command::Config => {
            let config_path = if cli.no_config { None } else { cli.config.as_deref() };
            ConfigLoader::print_config_sources(config_path);
            println!();
            print_config(&config);
        }
        Command::List { all } => {
            let (registry, report) = ToolRegistry::load(&config);
            print_tools(&registry, &report, &config, all);
        }
        Command::Describe { tool } => {
            let (registry, _) = ToolRegistry::load(&config);
            let Some(found) = registry.get_tool(&tool) else {
                bail!("Tool '{}' is not registered", tool);
            };
            println!("{}", found.name().bold());
            println!("{}", found.description());
        }
        Command::Run { tool, args, json } => {
            let mut arguments = match json {
                Some(raw) => parse_json_arguments(&raw)?,
                None => ToolArguments::new(),
            };
            arguments.extend(args);

            let (registry, _) = ToolRegistry::load(&config);
            let call = ToolCall::new(tool).with_arguments(arguments);
            let output = registry.execute(&call).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

fn parse_json_arguments(raw: &str) -> Result<ToolArguments> {
    let value: Value = serde_json::from_str(raw).context("--json is not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => bail!("--json must be a JSON object"),
    }
}

fn print_tools(
    registry: &ToolRegistry,
    report: &RegistrationReport,
    config: &FunctionsConfig,
    all: bool,
) {
    if !report.source_available {
        println!(
            "{} {}",
            "No functions manifest at".yellow(),
            config.functions_json.display()
        );
        return;
    }

    if let Some(error) = &report.manifest_error {
        println!("{} {}", "Failed to load manifest:".red(), error);
        return;
    }

    for name in registry.tool_names() {
        let summary = registry
            .get_tool(name)
            .map(|tool| tool.definition().description.lines().next().unwrap_or("").to_string())
            .unwrap_or_default();
        println!("{:<32} {}", name.bold(), summary);
    }

    if all {
        for (name, reason) in report.skipped() {
            let name = if name.is_empty() { "<unnamed>" } else { name };
            println!("{:<32} {}", name.dimmed(), format!("skipped: {}", reason).dimmed());
        }
    }
}

fn print_config(config: &FunctionsConfig) {
    println!("Resolved configuration:");
    println!("  functions_directory: {}", config.functions_directory.display());
    println!("  functions_json:      {}", config.functions_json.display());
    match &config.tool_allowlist {
        Some(list) if !list.is_empty() => println!("  tool_allowlist:      {}", list.join(", ")),
        _ => println!("  tool_allowlist:      (all tools)"),
    }
    println!("  tool_denylist:       {}", config.tool_denylist.join(", "));
    println!("  timeout:             {}s", config.timeout);
    println!("  max_output_size:     {} bytes", config.max_output_size);
}
