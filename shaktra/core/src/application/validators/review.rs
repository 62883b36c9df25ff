// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Code review output after `/shaktra:review`.

use serde_yaml::Value;
use std::path::Path;

use super::checks::{check_is_file, check_valid_yaml, children_matching, list_at, type_name};
use crate::domain::validation::{is_truthy, render, ValidationReport};

pub const VALID_SEVERITIES: [&str; 4] = ["P0", "P1", "P2", "P3"];
pub const VALID_VERDICTS: [&str; 4] = [
    "APPROVED",
    "APPROVED_WITH_NOTES",
    "CHANGES_REQUESTED",
    "BLOCKED",
];

pub fn validate_review(project_dir: &Path, story_id: &str) -> ValidationReport {
    let mut report = ValidationReport::new(format!("/shaktra:review ({story_id})"));
    let shaktra = project_dir.join(".shaktra");
    let story_dir = shaktra.join("stories").join(story_id);
    let handoff_path = story_dir.join("handoff.yml");

    if !check_is_file(&mut report, &handoff_path, "handoff.yml exists") {
        return report;
    }
    let Some(data) = check_valid_yaml(&mut report, &handoff_path, "handoff.yml valid YAML") else {
        return report;
    };

    let has_field = data.get("quality_findings").is_some();
    report.add(
        "quality_findings field present",
        has_field,
        if has_field { "" } else { "no quality_findings field" },
    );
    let findings = data.get("quality_findings");
    if let Some(list) = findings.and_then(Value::as_sequence) {
        check_findings(&mut report, list);
    }

    let review_files = children_matching(&story_dir, |n| n.contains("review"));
    if !review_files.is_empty() {
        report.pass("review artifact created");
    }

    let lessons_path = shaktra.join("memory").join("lessons.yml");
    let lessons = if check_is_file(&mut report, &lessons_path, "lessons.yml exists") {
        check_valid_yaml(&mut report, &lessons_path, "lessons.yml valid YAML")
    } else {
        None
    };
    let entries = lessons.as_ref().map(|l| list_at(l, "lessons")).unwrap_or(&[]);
    if lessons.is_some() {
        report.add(
            "lessons.yml has entries",
            !entries.is_empty(),
            format!("found {} entries", entries.len()),
        );
    }

    let findings_files = children_matching(&story_dir, |n| n.contains("findings"));
    let produced = findings.map(is_truthy).unwrap_or(false)
        || !review_files.is_empty()
        || !findings_files.is_empty();
    report.add(
        "review produced findings or artifacts",
        produced,
        if produced { "" } else { "no findings in handoff and no review artifact files" },
    );

    if !entries.is_empty() {
        let attributed = entries
            .iter()
            .any(|e| e.as_mapping().and_then(|m| m.get("source")).map(is_truthy).unwrap_or(false));
        report.add(
            "lessons have source attribution",
            attributed,
            if attributed { "" } else { "no lessons have a source field" },
        );
    }

    report
}

fn check_findings(report: &mut ValidationReport, findings: &[Value]) {
    if findings.is_empty() {
        report.pass("findings list present (may be empty)");
        return;
    }
    report.pass(format!("review produced {} finding(s)", findings.len()));

    let mut has_p0 = false;
    for (i, finding) in findings.iter().enumerate() {
        let Some(map) = finding.as_mapping() else {
            report.add(
                format!("finding[{i}] is dict"),
                false,
                format!("got {}", type_name(finding)),
            );
            continue;
        };

        let severity = map.get("severity").map(render).unwrap_or_default();
        let valid = VALID_SEVERITIES.contains(&severity.as_str());
        report.add(
            format!("finding[{i}] valid severity"),
            valid,
            if valid { String::new() } else { format!("got {severity:?}") },
        );
        has_p0 |= severity == "P0";

        for field in ["issue", "dimension"] {
            let present = map.get(field).map(is_truthy).unwrap_or(false);
            report.add(
                format!("finding[{i}] has '{field}'"),
                present,
                if present { "" } else { "missing or empty" },
            );
        }
    }

    // Informational: a P0 should come with a BLOCKED verdict, checked elsewhere.
    if has_p0 {
        report.pass("P0 findings detected (expect BLOCKED verdict)");
    }
}
