// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `.shaktra/` layout after `/shaktra:init`.

use std::path::Path;

use super::checks::{check_is_dir, check_is_file, check_valid_yaml};
use crate::domain::validation::{check_field_equals, check_field_exists, ValidationReport};

/// Project facts the init run was asked to record. Empty fields are only
/// required to exist.
#[derive(Debug, Clone, Default)]
pub struct InitExpectations {
    pub name: String,
    pub project_type: String,
    pub language: String,
}

const SUBDIRS: [&str; 4] = ["memory", "stories", "designs", "analysis"];
const MEMORY_STORES: [&str; 3] = ["principles.yml", "anti-patterns.yml", "procedures.yml"];

pub fn validate_init(project_dir: &Path, expected: &InitExpectations) -> ValidationReport {
    let mut report = ValidationReport::new("/shaktra:init");
    let shaktra = project_dir.join(".shaktra");

    if !check_is_dir(&mut report, &shaktra, ".shaktra/ directory exists") {
        return report;
    }

    let settings = shaktra.join("settings.yml");
    if check_is_file(&mut report, &settings, "settings.yml exists") {
        if let Some(data) = check_valid_yaml(&mut report, &settings, "settings.yml valid YAML") {
            for (path, value) in [
                ("project.name", &expected.name),
                ("project.type", &expected.project_type),
                ("project.language", &expected.language),
            ] {
                if value.is_empty() {
                    check_field_exists(&mut report, &data, path, None);
                } else {
                    check_field_equals(&mut report, &data, path, value.as_str(), None);
                }
            }
            for path in ["tdd.coverage_threshold", "quality.p1_threshold", "sprints.enabled"] {
                check_field_exists(&mut report, &data, path, None);
            }
        }
    }

    for subdir in SUBDIRS {
        check_is_dir(&mut report, &shaktra.join(subdir), &format!("{subdir}/ exists"));
    }

    for store in MEMORY_STORES {
        let path = shaktra.join("memory").join(store);
        if check_is_file(&mut report, &path, &format!("{store} exists")) {
            check_valid_yaml(&mut report, &path, &format!("{store} valid YAML"));
        }
    }

    let sprints = shaktra.join("sprints.yml");
    if check_is_file(&mut report, &sprints, "sprints.yml exists") {
        check_valid_yaml(&mut report, &sprints, "sprints.yml valid YAML");
    }

    let manifest = shaktra.join("analysis").join("manifest.yml");
    if check_is_file(&mut report, &manifest, "analysis/manifest.yml exists") {
        check_valid_yaml(&mut report, &manifest, "manifest.yml valid YAML");
    }

    check_is_file(&mut report, &shaktra.join("CLAUDE.md"), ".shaktra/CLAUDE.md exists");
    check_is_file(&mut report, &project_dir.join("CLAUDE.md"), "project CLAUDE.md exists");

    report
}
