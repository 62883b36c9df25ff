// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use shaktra_core::domain::retrieval::RetrievalConfig;
use shaktra_core::domain::settings::{apply_env_overrides, MemorySettings};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective memory retrieval configuration
    Show {
        /// Settings file (.shaktra/settings.yml)
        #[arg(value_name = "SETTINGS")]
        settings: PathBuf,
    },

    /// Validate memory retrieval settings
    Validate {
        /// Settings file (.shaktra/settings.yml)
        #[arg(value_name = "SETTINGS")]
        settings: PathBuf,
    },
}

pub async fn handle_command(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show { settings } => show(&settings),
        ConfigCommand::Validate { settings } => validate(&settings),
    }
}

fn load(path: &Path) -> Result<MemorySettings> {
    MemorySettings::load(path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

fn show(path: &Path) -> Result<()> {
    let settings = load(path)?;
    let mut config = settings.retrieval_config();
    apply_env_overrides(&mut config);

    println!("{}", "Memory retrieval:".bold());
    println!("{}", render_config(&config));

    let issues = settings.issues();
    if !issues.is_empty() {
        println!();
        println!("{}", "Replaced by defaults:".yellow());
        for issue in issues {
            println!("  {} = {} ({})", issue.key, issue.value, issue.reason);
        }
    }
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    println!("Validating memory settings...");
    let settings = load(path)?;

    let issues = settings.issues();
    for issue in &issues {
        println!("  {} memory.{}: '{}' is {}", "✗".red(), issue.key, issue.value, issue.reason);
    }
    if !issues.is_empty() {
        bail!("{} malformed memory setting(s) in {}", issues.len(), path.display());
    }

    let config = settings.retrieval_config();
    if config.tier1_max >= config.tier2_max {
        println!(
            "{}",
            format!(
                "  note: tier1_max ({}) >= tier2_max ({}), tier 2 is never selected",
                config.tier1_max, config.tier2_max
            )
            .yellow()
        );
    }

    println!("{}", "✓ Memory settings are valid".green());
    Ok(())
}

pub fn render_config(config: &RetrievalConfig) -> String {
    [
        format!("  tier1_max:  {}", config.tier1_max),
        format!("  tier2_max:  {}", config.tier2_max),
        format!("  chunk_size: {}", config.chunk_size),
    ]
    .join("\n")
}
