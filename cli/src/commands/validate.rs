// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Workflow validation commands
//!
//! Commands: init, analyze, dev, review, pm, tpm, incident, negative
//!
//! Each command prints a report and yields the process exit code: 0 when
//! every check passed, 1 otherwise. Usage errors exit with 2 (clap).

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use shaktra_core::application::validators::{self, InitExpectations};
use shaktra_core::domain::validation::ValidationReport;

#[derive(Subcommand)]
pub enum ValidateCommand {
    /// Check .shaktra/ after /shaktra:init
    Init {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,

        /// Expected project.name
        #[arg(value_name = "NAME")]
        name: Option<String>,

        /// Expected project.type
        #[arg(value_name = "TYPE")]
        project_type: Option<String>,

        /// Expected project.language
        #[arg(value_name = "LANGUAGE")]
        language: Option<String>,
    },

    /// Check analysis artifacts after /shaktra:analyze
    Analyze {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
    },

    /// Check story state after /shaktra:dev
    Dev {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
        #[arg(value_name = "STORY_ID")]
        story_id: String,
    },

    /// Check review output after /shaktra:review
    Review {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
        #[arg(value_name = "STORY_ID")]
        story_id: String,
    },

    /// Check PM artifacts after /shaktra:pm
    Pm {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
    },

    /// Check planning artifacts after /shaktra:tpm
    Tpm {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,

        /// Expect the hotfix route: one trivial story, no design doc, no sprint
        #[arg(long)]
        hotfix: bool,
    },

    /// Check post-mortem artifacts after /shaktra:incident
    Incident {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
        #[arg(value_name = "BUG_ID")]
        bug_id: String,
    },

    /// Error-path checks
    Negative {
        #[command(subcommand)]
        check: NegativeCheck,
    },
}

#[derive(Subcommand)]
pub enum NegativeCheck {
    /// Expected error patterns appear in the test log or artifacts
    ErrorDetected {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
        #[arg(value_name = "PATTERN")]
        patterns: Vec<String>,
    },

    /// Pre-flight blocked the story before a handoff was written
    NoHandoff {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
        #[arg(value_name = "STORY_ID", default_value = "UNKNOWN")]
        story_id: String,
    },

    /// The handoff did not progress past planning
    NoProgression {
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
        #[arg(value_name = "STORY_ID", default_value = "UNKNOWN")]
        story_id: String,
    },
}

pub async fn handle_command(command: ValidateCommand, json: bool) -> Result<i32> {
    let report = run(command);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_report(&report));
    }
    Ok(report.exit_code())
}

pub fn run(command: ValidateCommand) -> ValidationReport {
    match command {
        ValidateCommand::Init {
            project_dir,
            name,
            project_type,
            language,
        } => {
            let expected = InitExpectations {
                name: name.unwrap_or_default(),
                project_type: project_type.unwrap_or_default(),
                language: language.unwrap_or_default(),
            };
            validators::validate_init(&project_dir, &expected)
        }
        ValidateCommand::Analyze { project_dir } => validators::validate_analyze(&project_dir),
        ValidateCommand::Dev {
            project_dir,
            story_id,
        } => validators::validate_dev(&project_dir, &story_id),
        ValidateCommand::Review {
            project_dir,
            story_id,
        } => validators::validate_review(&project_dir, &story_id),
        ValidateCommand::Pm { project_dir } => validators::validate_pm(&project_dir),
        ValidateCommand::Tpm {
            project_dir,
            hotfix,
        } => validators::validate_tpm(&project_dir, hotfix),
        ValidateCommand::Incident {
            project_dir,
            bug_id,
        } => validators::validate_incident(&project_dir, &bug_id),
        ValidateCommand::Negative { check } => match check {
            NegativeCheck::ErrorDetected { project_dir, patterns } => {
                validators::validate_error_detected(&project_dir, &patterns)
            }
            NegativeCheck::NoHandoff { project_dir, story_id } => {
                validators::validate_no_handoff(&project_dir, &story_id)
            }
            NegativeCheck::NoProgression { project_dir, story_id } => {
                validators::validate_no_progression(&project_dir, &story_id)
            }
        },
    }
}

/// Human-readable report: one line per check, then a summary line.
pub fn render_report(report: &ValidationReport) -> String {
    let mut lines = vec![format!("{}", report.name.bold())];
    for check in &report.checks {
        let mark = if check.passed { "✓".green() } else { "✗".red() };
        if check.detail.is_empty() {
            lines.push(format!("  {mark} {}", check.name));
        } else {
            lines.push(format!("  {mark} {} ({})", check.name, check.detail.dimmed()));
        }
    }

    let summary = format!(
        "{}/{} checks passed",
        report.passed_count(),
        report.checks.len()
    );
    lines.push(if report.passed() {
        format!("{}", summary.green())
    } else {
        format!("{}", summary.red())
    });
    lines.join("\n")
}
