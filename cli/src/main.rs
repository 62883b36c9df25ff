// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Shaktra CLI
//!
//! The `shaktra` binary backs the scripts of the Shaktra workflow plugin.
//!
//! ## Commands
//!
//! - `shaktra memory retrieve|migrate` - Memory tiering and legacy migration
//! - `shaktra update` - Refresh the installed plugin from its marketplace
//! - `shaktra config show|validate` - Inspect memory retrieval settings
//! - `shaktra validate <workflow>` - Check `.shaktra/` after a workflow run
//!
//! Commands that feed other tools print a single JSON record on stdout;
//! logs always go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use shaktra_cli::commands::{self, ConfigCommand, MemoryCommand, ValidateCommand};

/// Shaktra workflow tooling
#[derive(Parser)]
#[command(name = "shaktra")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SHAKTRA_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Memory retrieval and migration
    #[command(name = "memory")]
    Memory {
        #[command(subcommand)]
        command: MemoryCommand,
    },

    /// Update the installed Shaktra plugin
    #[command(name = "update")]
    Update {
        #[command(flatten)]
        command: commands::UpdateCommand,
    },

    /// Memory retrieval settings
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Validate workflow artifacts
    #[command(name = "validate")]
    Validate {
        /// Print the report as JSON
        #[arg(long, global = true)]
        json: bool,

        #[command(subcommand)]
        command: ValidateCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Memory { command } => commands::memory::handle_command(command).await,
        Commands::Config { command } => commands::config::handle_command(command).await,
        Commands::Update { command } => commands::update::execute(command).await,
        Commands::Validate { json, command } => {
            let code = commands::validate::handle_command(command, json).await?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn missing_positional_is_a_usage_error() {
        let err = Cli::try_parse_from(["shaktra", "memory", "retrieve", "story"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn validate_accepts_trailing_json_flag() {
        let cli = Cli::try_parse_from(["shaktra", "validate", "tpm", "proj", "--hotfix", "--json"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Validate {
                json: true,
                command: ValidateCommand::Tpm { hotfix: true, .. },
            }
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
