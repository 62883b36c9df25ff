// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Product management artifacts after `/shaktra:pm`.

use std::path::Path;

use super::checks::{
    check_is_dir, check_valid_yaml, children_matching, count_with_source, is_yaml_name, list_at,
    paths_below,
};
use crate::domain::validation::ValidationReport;

const MIN_PRD_CHARS: usize = 200;
const PM_PATTERNS: [&str; 4] = ["persona", "journey", "prioriti", "research"];

pub fn validate_pm(project_dir: &Path) -> ValidationReport {
    let mut report = ValidationReport::new("/shaktra:pm");
    let shaktra = project_dir.join(".shaktra");

    if !check_is_dir(&mut report, &shaktra, ".shaktra/ exists") {
        return report;
    }

    let prd_path = shaktra.join("prd.md");
    let prd_found = prd_path.is_file()
        || !children_matching(&shaktra.join("designs"), |n| {
            n.contains("prd") || n.contains("PRD") || n.contains("requirement")
        })
        .is_empty();
    report.add(
        "PRD artifact found",
        prd_found,
        if prd_found { "" } else { "no PRD file in .shaktra/ or designs/" },
    );

    let pm_dir = shaktra.join("pm");
    if pm_dir.is_dir() {
        report.pass("pm/ directory exists");
        let artifacts = children_matching(&pm_dir, |_| true).len();
        report.add(
            "PM artifacts created",
            artifacts > 0,
            if artifacts > 0 {
                format!("found {artifacts} artifacts")
            } else {
                "pm/ is empty".to_string()
            },
        );
    } else {
        let mut any = false;
        for pattern in PM_PATTERNS {
            if !paths_below(&shaktra, |n| n.contains(pattern)).is_empty() {
                any = true;
                report.pass(format!("PM artifact (*{pattern}*) found"));
            }
        }
        if !any {
            report.add(
                "PM artifacts found",
                false,
                "no persona/journey/prioritization artifacts found",
            );
        }
    }

    if prd_path.is_file() {
        let chars = std::fs::read_to_string(&prd_path).map(|s| s.chars().count()).unwrap_or(0);
        report.add(
            "PRD content has substance (>200 chars)",
            chars > MIN_PRD_CHARS,
            if chars > MIN_PRD_CHARS { String::new() } else { format!("PRD only {chars} chars") },
        );
    }

    let mut persona_found = false;
    for sub in [shaktra.join("personas"), pm_dir.join("personas")] {
        for file in children_matching(&sub, is_yaml_name) {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let label = format!("{name} valid YAML");
            let Some(data) = check_valid_yaml(&mut report, &file, &label) else {
                continue;
            };
            let ok = data.get("name").is_some() && data.get("description").is_some();
            report.add(
                format!("{name} has required fields (name, description)"),
                ok,
                if ok { "" } else { "missing name or description" },
            );
            persona_found = true;
        }
    }
    if persona_found {
        report.pass("persona files found with required fields");
    }

    let journey_found = [shaktra.join("journeys"), pm_dir.join("journeys")]
        .iter()
        .any(|dir| !children_matching(dir, is_yaml_name).is_empty());
    report.add(
        "journey files found",
        journey_found,
        if journey_found { "" } else { "no journey YAML files found" },
    );

    if pm_dir.join("brainstorm.md").is_file() {
        report.pass("brainstorm notes found");
    }

    let memory = shaktra.join("memory");
    let decisions = memory.join("decisions.yml");
    if decisions.is_file() {
        check_valid_yaml(&mut report, &decisions, "decisions.yml valid YAML");
    }

    let lessons_path = memory.join("lessons.yml");
    if lessons_path.is_file() {
        let label = "lessons.yml valid YAML";
        if let Some(lessons) = check_valid_yaml(&mut report, &lessons_path, label) {
            let entries = list_at(&lessons, "lessons");
            let from_pm = count_with_source(entries, &["pm"]);
            report.add(
                "lessons captured with PM source",
                from_pm > 0,
                if from_pm > 0 {
                    String::new()
                } else {
                    format!("no lessons with PM source (total: {})", entries.len())
                },
            );
        }
    }

    report
}
