// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Story development state after `/shaktra:dev`.
//!
//! Reads `stories/<id>/handoff.yml` and the agent scratch files next to it.
//! Which summaries are required depends on how far the handoff progressed.

use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use super::checks::{check_is_file, check_valid_yaml, list_at};
use crate::domain::validation::{
    check_field_equals, check_field_exists, check_field_gte, check_field_in, check_field_nonempty,
    is_truthy, render, ValidationReport,
};

pub const VALID_PHASES: [&str; 7] = [
    "pending", "plan", "tests", "code", "quality", "complete", "failed",
];
const PHASE_SEQUENCE: [&str; 4] = ["plan", "tests", "code", "quality"];

/// Principles seeded in the fixture project before the run.
const SEEDED_PRINCIPLES: [(&str, &str); 2] = [
    ("PR-001", "email validation"),
    ("PR-002", "domain exceptions"),
];
const SEEDED_ANTI_PATTERN: (&str, &str) = ("AP-001", "raw db errors");

pub fn validate_dev(project_dir: &Path, story_id: &str) -> ValidationReport {
    let mut report = ValidationReport::new(format!("/shaktra:dev ({story_id})"));
    let shaktra = project_dir.join(".shaktra");
    let story_dir = shaktra.join("stories").join(story_id);
    let handoff_path = story_dir.join("handoff.yml");

    if !check_is_file(&mut report, &handoff_path, "handoff.yml exists") {
        report.add(
            "handoff.yml required for remaining checks",
            false,
            "cannot continue without handoff.yml",
        );
        return report;
    }
    let Some(data) = check_valid_yaml(&mut report, &handoff_path, "handoff.yml valid YAML") else {
        return report;
    };

    check_field_equals(&mut report, &data, "story_id", story_id, None);
    check_field_in(
        &mut report,
        &data,
        "current_phase",
        &VALID_PHASES,
        Some("current_phase is valid"),
    );

    let current = data
        .get("current_phase")
        .map(render)
        .unwrap_or_else(|| "pending".to_string());
    let pending = current == "pending";
    report.add(
        "current_phase beyond pending",
        !pending,
        if pending { "still pending" } else { "" },
    );

    check_field_nonempty(
        &mut report,
        &data,
        "completed_phases",
        Some("completed_phases non-empty"),
    );
    let completed: Vec<String> = list_at(&data, "completed_phases").iter().map(render).collect();
    if !completed.is_empty() {
        let in_order = is_phase_prefix(&completed);
        report.add(
            "completed_phases in correct order",
            in_order,
            if in_order { String::new() } else { format!("got {completed:?}") },
        );
    }
    let done = |phase: &str| completed.iter().any(|p| p == phase);

    check_field_nonempty(&mut report, &data, "plan_summary", Some("plan_summary populated"));
    check_field_exists(
        &mut report,
        &data,
        "plan_summary.components",
        Some("plan_summary has components"),
    );
    check_field_exists(
        &mut report,
        &data,
        "plan_summary.test_plan",
        Some("plan_summary has test_plan"),
    );
    check_is_file(
        &mut report,
        &story_dir.join("implementation_plan.md"),
        "implementation_plan.md created",
    );

    if done("tests") || matches!(current.as_str(), "code" | "quality" | "complete") {
        check_field_exists(&mut report, &data, "test_summary", Some("test_summary exists"));
        check_field_gte(
            &mut report,
            &data,
            "test_summary.test_count",
            1.0,
            Some("at least 1 test created"),
        );
        check_field_exists(
            &mut report,
            &data,
            "test_summary.test_files",
            Some("test_files listed"),
        );
    }

    if done("code") || matches!(current.as_str(), "quality" | "complete") {
        check_field_exists(&mut report, &data, "code_summary", Some("code_summary exists"));
        check_field_equals(
            &mut report,
            &data,
            "code_summary.all_tests_green",
            true,
            Some("all tests green"),
        );
        check_field_exists(&mut report, &data, "code_summary.coverage", Some("coverage recorded"));
        let summary = data.get("code_summary");
        let has_files = ["files_modified", "files_created"]
            .iter()
            .any(|k| summary.and_then(|s| s.get(*k)).map(is_truthy).unwrap_or(false));
        report.add(
            "code files listed",
            has_files,
            if has_files { "" } else { "no files_modified or files_created in code_summary" },
        );
    }

    check_observations(&mut report, &story_dir.join(".observations.yml"));
    check_briefing(&mut report, &story_dir.join(".briefing.yml"));

    if current == "complete" {
        check_field_equals(
            &mut report,
            &data,
            "memory_captured",
            true,
            Some("memory captured before completion"),
        );
        check_curated_principles(&mut report, &shaktra.join("memory").join("principles.yml"));
        for store in ["anti-patterns.yml", "procedures.yml"] {
            let path = shaktra.join("memory").join(store);
            if check_is_file(&mut report, &path, &format!("{store} exists")) {
                check_valid_yaml(&mut report, &path, &format!("{store} valid YAML"));
            }
        }
    }

    check_feature_branch(&mut report, project_dir);
    report
}

/// Completed phases must follow plan, tests, code, quality from the start.
fn is_phase_prefix(completed: &[String]) -> bool {
    completed.len() <= PHASE_SEQUENCE.len()
        && completed
            .iter()
            .zip(PHASE_SEQUENCE)
            .all(|(got, want)| got == want)
}

fn check_observations(report: &mut ValidationReport, path: &Path) {
    let exists = path.is_file();
    report.add(
        "observations file created",
        exists,
        if exists { "" } else { "no .observations.yml in story dir" },
    );
    if !exists {
        return;
    }
    let Some(data) = check_valid_yaml(report, path, ".observations.yml valid YAML") else {
        return;
    };
    let observations = list_at(&data, "observations");
    report.add(
        "observations written by agents",
        !observations.is_empty(),
        format!("found {} observations", observations.len()),
    );
    if let Some(first) = observations.first() {
        require_fields(report, first, &["id", "agent", "phase", "type", "text"], "observation");
    }
}

fn check_briefing(report: &mut ValidationReport, path: &Path) {
    let exists = path.is_file();
    report.add(
        "briefing file generated",
        exists,
        if exists { "" } else { "no .briefing.yml in story dir" },
    );
    if !exists {
        return;
    }
    let Some(data) = check_valid_yaml(report, path, ".briefing.yml valid YAML") else {
        return;
    };

    if data.get("relevant_principles").map(Value::is_sequence).unwrap_or(true) {
        let ids = ids_of(list_at(&data, "relevant_principles"));
        for (id, topic) in SEEDED_PRINCIPLES {
            require_id(report, &ids, id, &format!("briefing includes seeded {id} ({topic})"));
        }
    }
    if data.get("relevant_anti_patterns").map(Value::is_sequence).unwrap_or(true) {
        let ids = ids_of(list_at(&data, "relevant_anti_patterns"));
        let (id, topic) = SEEDED_ANTI_PATTERN;
        require_id(report, &ids, id, &format!("briefing includes seeded {id} ({topic})"));
    }
}

fn check_curated_principles(report: &mut ValidationReport, path: &Path) {
    if !check_is_file(report, path, "principles.yml exists") {
        return;
    }
    let Some(data) = check_valid_yaml(report, path, "principles.yml valid YAML") else {
        return;
    };
    let principles = list_at(&data, "principles");
    report.add(
        "principles created by memory-curator",
        !principles.is_empty(),
        format!("found {} principles", principles.len()),
    );
    let Some(first) = principles.first() else {
        return;
    };
    require_fields(report, first, &["id", "text", "confidence", "source"], "principle");

    let ids = ids_of(principles);
    for (id, _) in SEEDED_PRINCIPLES {
        let present = ids.contains(id);
        report.add(
            format!("seeded {id} still present after consolidation"),
            present,
            if present { String::new() } else { format!("{id} missing from principles.yml") },
        );
    }

    let seeded = SEEDED_PRINCIPLES.len();
    let created = principles.len().saturating_sub(seeded);
    report.add(
        "memory-curator created new principles",
        created > 0,
        if created > 0 {
            format!("{created} new principle(s) created")
        } else {
            format!("only seeded principles remain (total: {})", principles.len())
        },
    );
}

fn require_fields(report: &mut ValidationReport, entry: &Value, fields: &[&str], what: &str) {
    for field in fields {
        let has = entry.as_mapping().map(|m| m.contains_key(*field)).unwrap_or(false);
        report.add(
            format!("{what} has '{field}' field"),
            has,
            if has { String::new() } else { format!("missing from {what} entry") },
        );
    }
}

fn require_id(report: &mut ValidationReport, ids: &BTreeSet<String>, id: &str, label: &str) {
    let present = ids.contains(id);
    report.add(
        label,
        present,
        if present { String::new() } else { format!("{id} not in briefing (found: {ids:?})") },
    );
}

fn ids_of(entries: &[Value]) -> BTreeSet<String> {
    entries
        .iter()
        .filter_map(|e| e.as_mapping()?.get("id").map(render))
        .collect()
}

/// Work must happen on a feature branch, never directly on main/master.
fn check_feature_branch(report: &mut ValidationReport, project_dir: &Path) {
    let output = Command::new("git")
        .arg("-C")
        .arg(project_dir)
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output();
    match output {
        Ok(output) => {
            let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let on_feature = !matches!(branch.as_str(), "main" | "master" | "");
            report.add(
                "on feature branch",
                on_feature,
                if on_feature { format!("branch: {branch}") } else { format!("on '{branch}'") },
            );
        }
        Err(e) => {
            report.add("git branch check", false, format!("git error: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn phase_prefix_ordering() {
        assert!(is_phase_prefix(&phases(&["plan"])));
        assert!(is_phase_prefix(&phases(&["plan", "tests", "code", "quality"])));
        assert!(!is_phase_prefix(&phases(&["tests"])));
        assert!(!is_phase_prefix(&phases(&["plan", "code"])));
        assert!(!is_phase_prefix(&phases(&["plan", "tests", "code", "quality", "complete"])));
    }

    #[test]
    fn ids_skip_non_mappings() {
        let entries: Vec<Value> =
            serde_yaml::from_str("- {id: PR-001}\n- PR-002\n- {text: x}\n").unwrap();
        let ids = ids_of(&entries);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("PR-001"));
    }
}
