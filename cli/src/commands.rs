//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for toolguard
#[derive(Parser, Debug)]
#[command(name = "toolguard")]
#[command(author, version, about = "Tool-call correction and conversation-safety pipeline")]
#[command(long_about = r#"
toolguard runs the checks a chat-completion gateway applies around a backend
model call: loop detection and tool filtering before the call, tool-call
correction and the plan-exit guard after it.

Configuration files are loaded from (in priority order):
1. TOOLGUARD_* environment variables (e.g. TOOLGUARD_ADJUDICATOR__ENABLED=true)
2. --config <path>        Explicit config file
3. ./toolguard.toml       Project-level config
4. ~/.config/toolguard/config.toml   Global config

Example:
  toolguard pre-forward --request request.json
  toolguard post-response --request request.json --response response.json
  toolguard show-config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run loop detection and tool filtering on a request
    PreForward {
        /// Request fixture: {"messages": [...], "tools": [...]}
        #[arg(long, value_name = "FILE")]
        request: PathBuf,
    },

    /// Run tool-call correction and the plan-exit guard on a backend response
    PostResponse {
        /// Request fixture the response answers
        #[arg(long, value_name = "FILE")]
        request: PathBuf,

        /// Response fixture: {"content": "...", "tool_calls": [...], "stop_reason": "..."}
        #[arg(long, value_name = "FILE")]
        response: PathBuf,
    },

    /// Show configuration sources and the effective configuration
    ShowConfig,
}
