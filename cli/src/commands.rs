//! CLI command definitions

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// CLI arguments for fnbridge
#[derive(Parser, Debug)]
#[command(name = "fnbridge")]
#[command(author, version, about = "Expose llm-functions tool scripts as callable tools")]
#[command(long_about = r#"
fnbridge reads the functions.json manifest of an llm-functions checkout and
exposes every declared tool as a callable function. Calling a tool runs its
script with --kebab-case flags and returns what it wrote to $LLM_OUTPUT and
stdout.

Configuration is loaded from (in priority order):
1. LLM_FUNCTIONS_DIR / AICHAT_FUNCTIONS_DIR / LLM_FUNCTIONS_JSON
2. --config <path>, else ~/.config/io.datasette.llm/llm-functions.yaml
3. Built-in defaults (~/llm-functions)

Example:
  fnbridge list
  fnbridge describe get_current_weather
  fnbridge run get_current_weather -a location=Paris
  fnbridge run fs_ls --json '{"path": "."}'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered tools
    List {
        /// Also show tools that were skipped, with the reason
        #[arg(short, long)]
        all: bool,
    },

    /// Show the generated description of a tool
    Describe {
        /// Tool name
        tool: String,
    },

    /// Invoke a tool
    Run {
        /// Tool name
        tool: String,

        /// Argument as key=value; JSON values (true, 3, [..]) are parsed, anything else is a string
        #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        args: Vec<(String, Value)>,

        /// Arguments as a JSON object; `--arg` values override its keys
        #[arg(long, value_name = "OBJECT")]
        json: Option<String>,
    },

    /// Show configuration sources and resolved values
    Config,
}

fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;

    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
