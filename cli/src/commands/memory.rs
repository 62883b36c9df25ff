// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Memory commands
//!
//! Commands: retrieve, migrate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use shaktra_core::application::{MemoryMigrationService, MemoryRetrievalService};
use shaktra_core::domain::principle::MigrationSummary;

#[derive(Subcommand)]
pub enum MemoryCommand {
    /// Select the retrieval tier for a story; writes chunks for tier 3
    Retrieve {
        /// Story directory (.shaktra/stories/<id>)
        #[arg(value_name = "STORY_DIR")]
        story_dir: PathBuf,

        /// Settings file (.shaktra/settings.yml)
        #[arg(value_name = "SETTINGS")]
        settings: PathBuf,
    },

    /// Convert legacy decisions.yml and lessons.yml into principles.yml
    Migrate {
        /// Project root containing .shaktra/
        #[arg(value_name = "PROJECT_ROOT", default_value = ".")]
        project_root: PathBuf,
    },
}

pub async fn handle_command(command: MemoryCommand) -> Result<()> {
    match command {
        MemoryCommand::Retrieve { story_dir, settings } => retrieve(story_dir, settings),
        MemoryCommand::Migrate { project_root } => migrate(project_root),
    }
}

fn retrieve(story_dir: PathBuf, settings: PathBuf) -> Result<()> {
    let service = MemoryRetrievalService::for_story(&story_dir, &settings)
        .context("Failed to prepare memory retrieval")?;
    let decision = service
        .retrieve()
        .with_context(|| format!("Memory retrieval failed for {}", story_dir.display()))?;

    println!("{}", serde_json::to_string(&decision)?);
    Ok(())
}

fn migrate(project_root: PathBuf) -> Result<()> {
    let service = MemoryMigrationService::new(&project_root);
    let summary = service
        .migrate()
        .with_context(|| format!("Migration failed in {}", service.memory_dir().display()))?;

    println!("{}", migration_report(&summary));
    Ok(())
}

pub fn migration_report(summary: &MigrationSummary) -> String {
    let mut lines = vec![format!(
        "{}",
        format!(
            "✓ Migrated {} decision(s) and {} lesson(s) to {}",
            summary.decisions_migrated,
            summary.lessons_migrated,
            summary.principles_path.display()
        )
        .green()
    )];
    for backup in &summary.backups {
        lines.push(format!("  backup: {}", backup.display()));
    }
    if summary.total() == 0 {
        let note = "No legacy records found; wrote an empty principles store";
        lines.push(format!("{}", note.yellow()));
    }
    lines.join("\n")
}
