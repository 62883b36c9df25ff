// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Post-mortem artifacts after `/shaktra:incident`.

use serde_yaml::Value;
use std::path::Path;

use super::checks::{check_is_dir, check_is_file, check_valid_yaml, list_at, load_yaml, type_name};
use super::review::VALID_SEVERITIES;
use crate::domain::validation::{
    check_field_exists, check_list_min_length, is_truthy, render, ValidationReport,
};

pub fn validate_incident(project_dir: &Path, bug_id: &str) -> ValidationReport {
    let mut report = ValidationReport::new(format!("/shaktra:incident ({bug_id})"));
    let shaktra = project_dir.join(".shaktra");
    let incident_dir = shaktra.join("incidents").join(bug_id);

    if !check_is_dir(&mut report, &incident_dir, "incident directory exists") {
        return report;
    }
    let postmortem_path = incident_dir.join("postmortem.yml");
    if !check_is_file(&mut report, &postmortem_path, "postmortem.yml exists") {
        return report;
    }
    let Some(raw) = check_valid_yaml(&mut report, &postmortem_path, "postmortem.yml valid YAML")
        .filter(is_truthy)
    else {
        return report;
    };
    let postmortem = unwrap_section(&raw, "postmortem");

    check_list_min_length(
        &mut report,
        postmortem,
        "timeline",
        1,
        Some("postmortem has timeline (non-empty list)"),
    );
    check_field_exists(
        &mut report,
        postmortem,
        "root_cause_chain.primary",
        Some("postmortem has root_cause_chain.primary"),
    );
    check_field_exists(&mut report, postmortem, "impact", Some("postmortem has impact section"));
    check_list_min_length(
        &mut report,
        postmortem,
        "action_items",
        1,
        Some("postmortem has action_items (non-empty list)"),
    );
    check_action_items(&mut report, list_at(postmortem, "action_items"));

    let detection_path = incident_dir.join("detection-gap.yml");
    let detection = detection_path.is_file();
    report.add(
        "detection-gap.yml exists",
        detection,
        if detection {
            ""
        } else {
            "no detection-gap.yml (auto_detection_gap may be off)"
        },
    );
    if detection {
        let label = "detection-gap.yml valid YAML";
        if let Some(raw) = check_valid_yaml(&mut report, &detection_path, label).filter(is_truthy) {
            check_list_min_length(
                &mut report,
                unwrap_section(&raw, "detection_gap"),
                "gates_passed",
                1,
                Some("detection gap has gates_passed (non-empty list)"),
            );
        }
    }

    let runbook = incident_dir.join("runbook.yml").is_file();
    report.add(
        "runbook.yml exists",
        runbook,
        if runbook {
            ""
        } else {
            "no runbook.yml (runbook_auto_generate may be off)"
        },
    );

    let observations = incident_dir.join(".observations.yml").is_file();
    report.add(
        "observations file exists",
        observations,
        if observations {
            ""
        } else {
            "no .observations.yml in incident dir"
        },
    );

    let principles_path = shaktra.join("memory").join("principles.yml");
    if check_is_file(&mut report, &principles_path, "principles.yml exists") {
        let label = "principles.yml valid YAML";
        let principles = check_valid_yaml(&mut report, &principles_path, label).filter(is_truthy);
        if let Some(data) = principles {
            let entries = list_at(&data, "principles");
            report.add(
                "principles.yml has entries",
                !entries.is_empty(),
                format!("found {} entries", entries.len()),
            );
        }
    }

    let settings_path = shaktra.join("settings.yml");
    if settings_path.is_file() {
        if let Ok(settings) = load_yaml(&settings_path) {
            if is_truthy(&settings) {
                let has = settings.get("incident").is_some();
                report.add(
                    "settings has incident section",
                    has,
                    if has { "" } else { "missing incident in settings.yml" },
                );
            }
        }
    }

    report
}

/// Artifacts nest their fields under a top-level key; older ones are flat.
fn unwrap_section<'a>(raw: &'a Value, key: &str) -> &'a Value {
    raw.get(key).unwrap_or(raw)
}

fn check_action_items(report: &mut ValidationReport, items: &[Value]) {
    for (i, item) in items.iter().enumerate() {
        let Some(map) = item.as_mapping() else {
            report.add(
                format!("action_item[{i}] is dict"),
                false,
                format!("got {}", type_name(item)),
            );
            continue;
        };
        let priority = map.get("priority").map(render).unwrap_or_default();
        let valid = VALID_SEVERITIES.contains(&priority.as_str());
        report.add(
            format!("action_item[{i}] valid priority"),
            valid,
            if valid { String::new() } else { format!("got {priority:?}") },
        );
    }
}
