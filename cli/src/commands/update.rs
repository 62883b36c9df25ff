// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plugin Update Command
//!
//! This module implements the `shaktra update` command, which refreshes the
//! installed plugin from the release branch of its marketplace clone.
//!
//! # Architecture
//!
//! - **Layer:** CLI/Presentation
//! - **Purpose:** Plugin self-update
//! - **Integration:** CLI → PluginUpdater → git + plugin registry files
//!
//! # Usage
//!
//! ```bash
//! # Update when the release branch carries a newer version
//! shaktra update "$CLAUDE_PLUGIN_ROOT"
//!
//! # Reinstall even if versions match
//! shaktra update "$CLAUDE_PLUGIN_ROOT" --force
//! ```
//!
//! # Output
//!
//! Exactly one JSON record on stdout (`updated`, `up_to_date` or `error`).
//! The exit code is 0 in all three cases; callers branch on `status`.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use shaktra_core::application::PluginUpdater;
use shaktra_core::domain::plugin::UpdateOutcome;
use shaktra_core::infrastructure::GitCli;

#[derive(Args)]
pub struct UpdateCommand {
    /// Root of the installed plugin (contains .claude-plugin/plugin.json)
    #[arg(value_name = "PLUGIN_ROOT")]
    plugin_root: PathBuf,

    /// Update even when the release version matches the installed one
    #[arg(long)]
    force: bool,

    /// Host plugins directory (default: ~/.claude/plugins)
    #[arg(long, env = "SHAKTRA_PLUGINS_DIR", value_name = "DIR")]
    plugins_dir: Option<PathBuf>,
}

pub async fn execute(cmd: UpdateCommand) -> Result<()> {
    let outcome = match cmd.plugins_dir.or_else(default_plugins_dir) {
        Some(plugins_dir) => {
            PluginUpdater::new(GitCli::new(), plugins_dir)
                .run(&cmd.plugin_root, cmd.force)
                .await
        }
        None => UpdateOutcome::Error {
            message: "Cannot determine home directory for the plugins directory".to_string(),
        },
    };

    let record = serde_json::to_string(&outcome).context("Failed to serialize update outcome")?;
    println!("{record}");
    Ok(())
}

fn default_plugins_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join("plugins"))
}
