// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Error-path checks: the workflow was expected to stop early or to
//! surface a specific error.

use serde_yaml::Value;
use std::path::{Path, PathBuf};

use super::checks::{files_below, list_at, load_yaml};
use crate::domain::validation::{render, ValidationReport};

/// Log file the harness tees workflow output into.
pub const TEST_LOG: &str = ".shaktra-test.log";

const SCANNED_SUFFIXES: [&str; 4] = [".yml", ".yaml", ".md", ".log"];

/// Every pattern must appear (case-insensitive) in the harness log or in a
/// text artifact under `.shaktra/`.
pub fn validate_error_detected(project_dir: &Path, patterns: &[String]) -> ValidationReport {
    let mut report = ValidationReport::new("negative test (error detection)");

    let mut haystack = std::fs::read_to_string(project_dir.join(TEST_LOG))
        .unwrap_or_default()
        .to_lowercase();
    let artifacts = files_below(&project_dir.join(".shaktra"), |n| {
        SCANNED_SUFFIXES.iter().any(|s| n.ends_with(s))
    });
    for path in artifacts {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                haystack.push('\n');
                haystack.push_str(&content.to_lowercase());
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable artifact")
            }
        }
    }

    for pattern in patterns {
        let found = haystack.contains(&pattern.to_lowercase());
        report.add(
            format!("error pattern detected: '{pattern}'"),
            found,
            if found { "" } else { "pattern not found in logs/artifacts" },
        );
    }
    report
}

/// Pre-flight must have refused the story before any handoff was written.
pub fn validate_no_handoff(project_dir: &Path, story_id: &str) -> ValidationReport {
    let mut report = ValidationReport::new(format!("negative test (no handoff for {story_id})"));
    let exists = handoff_path(project_dir, story_id).is_file();
    report.add(
        "no handoff created (pre-flight blocked)",
        !exists,
        if exists { "handoff.yml exists, pre-flight did not block" } else { "" },
    );
    report
}

/// A handoff may exist but must not have moved past planning.
pub fn validate_no_progression(project_dir: &Path, story_id: &str) -> ValidationReport {
    let mut report =
        ValidationReport::new(format!("negative test (no progression for {story_id})"));
    let path = handoff_path(project_dir, story_id);

    if !path.is_file() {
        report.pass("no handoff (blocked at pre-flight)");
        return report;
    }

    let data = match load_yaml(&path) {
        Ok(Value::Null) => Value::Mapping(Default::default()),
        Ok(data) => data,
        Err(_) => {
            report.add("handoff readable", false, "failed to parse");
            return report;
        }
    };

    let phase = data.get("current_phase").map(render).unwrap_or_default();
    let completed: Vec<String> = list_at(&data, "completed_phases").iter().map(render).collect();
    report.add(
        "handoff did not progress past plan",
        matches!(phase.as_str(), "" | "pending" | "plan") && completed.len() <= 1,
        format!("current_phase={phase}, completed={completed:?}"),
    );
    report
}

fn handoff_path(project_dir: &Path, story_id: &str) -> PathBuf {
    project_dir
        .join(".shaktra")
        .join("stories")
        .join(story_id)
        .join("handoff.yml")
}
