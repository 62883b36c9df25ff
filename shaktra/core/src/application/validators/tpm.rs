// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Planning artifacts after `/shaktra:tpm`: design docs, story files,
//! sprint allocation and curated memory. Hotfix mode expects a single
//! trivial story, no design doc and no sprint.

use serde_yaml::Value;
use std::path::Path;

use super::checks::{
    check_glob_matches, check_is_dir, check_is_file, check_valid_yaml, glob_in, list_at, load_yaml,
    validate_all_yaml_in_dir,
};
use crate::domain::validation::{
    check_field_equals, check_field_exists, check_field_in, check_field_in_numbers,
    check_field_nonempty, check_list_min_length, is_truthy, lookup, render, ValidationReport,
};

pub const VALID_TIERS: [&str; 4] = ["trivial", "small", "medium", "large"];
pub const VALID_SCOPES: [&str; 11] = [
    "bug_fix",
    "feature",
    "refactor",
    "config",
    "docs",
    "test",
    "performance",
    "security",
    "integration",
    "migration",
    "scaffold",
];
pub const VALID_PRIORITIES: [&str; 4] = ["critical", "high", "medium", "low"];
pub const VALID_STORY_STATUSES: [&str; 3] = ["planned", "in_progress", "done"];
pub const STORY_POINTS: [i64; 6] = [1, 2, 3, 5, 8, 10];

const MAX_TITLE_CHARS: usize = 100;
const MAX_STORY_POINTS: f64 = 10.0;
const MAX_FILES: usize = 3;
const MIN_DESIGN_CHARS: usize = 50;

/// Fields every new principle written by the memory curator carries.
const PRINCIPLE_FIELDS: [&str; 5] = ["id", "text", "confidence", "source", "status"];

pub fn validate_tpm(project_dir: &Path, hotfix: bool) -> ValidationReport {
    let name = if hotfix { "/shaktra:tpm (hotfix)" } else { "/shaktra:tpm" };
    let mut report = ValidationReport::new(name);
    let shaktra = project_dir.join(".shaktra");

    let designs_dir = shaktra.join("designs");
    if check_is_dir(&mut report, &designs_dir, "designs/ exists") && !hotfix {
        let designs = check_glob_matches(
            &mut report,
            &designs_dir,
            "*-design.md",
            1,
            "at least 1 design doc created",
        );
        for design in designs {
            check_design_doc(&mut report, &design);
        }
    }

    let stories_dir = shaktra.join("stories");
    if check_is_dir(&mut report, &stories_dir, "stories/ exists") {
        let (min, label) = if hotfix {
            (1, "at least 1 story (hotfix) created")
        } else {
            (2, "at least 2 stories created")
        };
        let stories = check_glob_matches(&mut report, &stories_dir, "ST-*.yml", min, label);
        for story in &stories {
            check_story(&mut report, story, hotfix);
        }

        let markdown: Vec<String> = glob_in(&stories_dir, "ST-*.md")
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect();
        report.add(
            "no .md story files (stories must be .yml)",
            markdown.is_empty(),
            if markdown.is_empty() {
                String::new()
            } else {
                format!("found {} .md files: {markdown:?}", markdown.len())
            },
        );
    }

    let sprints_path = shaktra.join("sprints.yml");
    if check_is_file(&mut report, &sprints_path, "sprints.yml exists") {
        let sprints = check_valid_yaml(&mut report, &sprints_path, "sprints.yml valid YAML")
            .filter(is_truthy);
        if let Some(sprints) = sprints {
            if hotfix {
                let current = sprints.get("current_sprint").filter(|v| !is_unset(v));
                report.add(
                    "hotfix did not create a sprint",
                    current.is_none(),
                    current
                        .map(|v| format!("current_sprint is set: {}", render(v)))
                        .unwrap_or_default(),
                );
            } else {
                check_field_nonempty(
                    &mut report,
                    &sprints,
                    "current_sprint",
                    Some("current_sprint populated"),
                );
            }
        }
    }

    let memory_dir = shaktra.join("memory");
    let principles_path = memory_dir.join("principles.yml");
    if check_is_file(&mut report, &principles_path, "principles.yml exists") {
        let label = "principles.yml valid YAML";
        let principles = check_valid_yaml(&mut report, &principles_path, label).filter(is_truthy);
        if let (Some(data), false) = (principles, hotfix) {
            check_list_min_length(
                &mut report,
                &data,
                "principles",
                1,
                Some("principles.yml has at least 1 entry (memory-curator ran)"),
            );
            if let Some(latest) = list_at(&data, "principles").last() {
                for field in PRINCIPLE_FIELDS {
                    let has = latest
                        .as_mapping()
                        .map(|m| m.contains_key(field))
                        .unwrap_or(false);
                    report.add(
                        format!("latest principle has '{field}' field"),
                        has,
                        if has { "" } else { "missing from principle entry" },
                    );
                }
            }
        }
    }

    for store in ["anti-patterns.yml", "procedures.yml"] {
        let path = memory_dir.join(store);
        if check_is_file(&mut report, &path, &format!("{store} exists")) {
            check_valid_yaml(&mut report, &path, &format!("{store} valid YAML"));
        }
    }

    validate_all_yaml_in_dir(&mut report, &stories_dir);

    report
}

/// Null or an empty mapping.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

fn check_design_doc(report: &mut ValidationReport, path: &Path) {
    let name = file_name(path);
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let ok = content.trim().chars().count() > MIN_DESIGN_CHARS;
            report.add(
                format!("{name} has content"),
                ok,
                if ok {
                    String::new()
                } else {
                    format!("only {} chars", content.chars().count())
                },
            );
        }
        Err(e) => {
            report.add(format!("{name} readable"), false, e.to_string());
        }
    }
}

/// Story file checks, scaled by tier.
fn check_story(report: &mut ValidationReport, path: &Path, hotfix: bool) {
    let name = file_name(path);
    let data = match load_yaml(path) {
        Ok(data) => {
            report.pass(format!("{name} valid YAML"));
            data
        }
        Err(detail) => {
            report.add(format!("{name} valid YAML"), false, detail);
            return;
        }
    };

    for field in ["id", "title", "description", "tier"] {
        let label = format!("{name}: '{field}' exists");
        check_field_exists(report, &data, field, Some(label.as_str()));
    }
    let label = format!("{name}: valid tier");
    check_field_in(report, &data, "tier", &VALID_TIERS, Some(label.as_str()));

    if let Some(title) = data.get("title").and_then(Value::as_str) {
        let chars = title.chars().count();
        let ok = chars <= MAX_TITLE_CHARS;
        report.add(
            format!("{name}: title ≤100 chars"),
            ok,
            if ok { String::new() } else { format!("title is {chars} chars") },
        );
    }

    let described = data
        .get("description")
        .filter(|v| is_truthy(v))
        .map(|v| !render(v).trim().is_empty())
        .unwrap_or(false);
    report.add(
        format!("{name}: description non-empty"),
        described,
        if described { "" } else { "description is empty" },
    );

    if hotfix {
        check_field_equals(
            report,
            &data,
            "tier",
            "trivial",
            Some(format!("{name}: hotfix tier is trivial").as_str()),
        );
    }

    let label = format!("{name}: metadata exists");
    if check_field_exists(report, &data, "metadata", Some(label.as_str())) {
        check_field_in(
            report,
            &data,
            "metadata.priority",
            &VALID_PRIORITIES,
            Some(format!("{name}: valid priority").as_str()),
        );
        check_field_in_numbers(
            report,
            &data,
            "metadata.story_points",
            &STORY_POINTS,
            Some(format!("{name}: valid story_points").as_str()),
        );
        check_field_in(
            report,
            &data,
            "metadata.status",
            &VALID_STORY_STATUSES,
            Some(format!("{name}: valid status").as_str()),
        );
        check_field_exists(
            report,
            &data,
            "metadata.blocked_by",
            Some(format!("{name}: blocked_by exists").as_str()),
        );
    }

    let tier = data.get("tier").and_then(Value::as_str).unwrap_or_default();
    let at_least_small = matches!(tier, "small" | "medium" | "large");
    let at_least_medium = matches!(tier, "medium" | "large");

    if at_least_small {
        let label = format!("{name}: files (≥ small)");
        check_field_exists(report, &data, "files", Some(label.as_str()));
        check_field_exists(
            report,
            &data,
            "acceptance_criteria",
            Some(format!("{name}: acceptance_criteria (≥ small)").as_str()),
        );
    }

    if at_least_medium {
        let label = format!("{name}: scope (≥ medium)");
        check_field_exists(report, &data, "scope", Some(label.as_str()));
        if data.get("scope").is_some() {
            let label = format!("{name}: valid scope");
            check_field_in(report, &data, "scope", &VALID_SCOPES, Some(label.as_str()));
        }
        for field in ["test_specs", "interfaces", "io_examples", "error_handling"] {
            let label = format!("{name}: {field} (≥ medium)");
            check_field_exists(report, &data, field, Some(label.as_str()));
        }
    }

    if tier == "large" {
        for field in ["edge_cases", "feature_flags"] {
            let label = format!("{name}: {field} (large)");
            check_field_exists(report, &data, field, Some(label.as_str()));
        }
    }

    let points = match lookup(&data, "metadata.story_points") {
        None => Some(0.0),
        Some(v) => v.as_f64(),
    };
    if let Some(points) = points {
        let ok = points <= MAX_STORY_POINTS;
        report.add(
            format!("{name}: story_points ≤ 10"),
            ok,
            if ok { String::new() } else { format!("got {points}") },
        );
    }

    if at_least_small {
        let files = match data.get("files") {
            None => Some(0),
            Some(v) => v.as_sequence().map(Vec::len),
        };
        if let Some(count) = files {
            let ok = count <= MAX_FILES;
            report.add(
                format!("{name}: files ≤ 3"),
                ok,
                if ok { String::new() } else { format!("got {count}") },
            );
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
