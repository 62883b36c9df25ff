// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Brownfield analysis artifacts after `/shaktra:analyze`.

use serde_yaml::Value;
use std::path::Path;

use super::checks::{check_is_dir, check_is_file, check_valid_yaml};
use crate::domain::validation::{check_field_in, lookup, ValidationReport};

pub const DIMENSION_FILES: [&str; 9] = [
    "structure.yml",
    "domain-model.yml",
    "entry-points.yml",
    "practices.yml",
    "dependencies.yml",
    "tech-debt.yml",
    "data-flows.yml",
    "critical-paths.yml",
    "git-intelligence.yml",
];

const MIN_DIMENSIONS: usize = 3;

pub fn validate_analyze(project_dir: &Path) -> ValidationReport {
    let mut report = ValidationReport::new("/shaktra:analyze");
    let shaktra = project_dir.join(".shaktra");
    let analysis = shaktra.join("analysis");

    if !check_is_dir(&mut report, &analysis, "analysis/ exists") {
        return report;
    }

    let manifest = analysis.join("manifest.yml");
    if check_is_file(&mut report, &manifest, "manifest.yml exists") {
        if let Some(data) = check_valid_yaml(&mut report, &manifest, "manifest.yml valid YAML") {
            check_field_in(
                &mut report,
                &data,
                "status",
                &["in_progress", "complete", "partial"],
                Some("manifest status progressed"),
            );
            let completed = completed_dimensions(&data);
            report.add(
                "at least 3 dimensions completed",
                completed >= MIN_DIMENSIONS,
                format!("found {completed} completed dimensions"),
            );
        }
    }

    let mut artifacts = 0;
    for name in DIMENSION_FILES {
        let path = analysis.join(name);
        if path.is_file() {
            artifacts += 1;
            check_valid_yaml(&mut report, &path, &format!("{name} valid YAML"));
        }
    }
    report.add(
        "at least 3 dimension artifacts created",
        artifacts >= MIN_DIMENSIONS,
        format!("found {artifacts} of {}", DIMENSION_FILES.len()),
    );

    let principles = shaktra.join("memory").join("principles.yml");
    if principles.is_file() {
        check_valid_yaml(&mut report, &principles, "principles.yml valid YAML");
    }

    report
}

fn completed_dimensions(manifest: &Value) -> usize {
    lookup(manifest, "stages.dimensions")
        .and_then(Value::as_mapping)
        .map(|dims| {
            dims.values()
                .filter(|d| d.get("status").and_then(Value::as_str) == Some("complete"))
                .count()
        })
        .unwrap_or(0)
}
