// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Filesystem checks shared by the workflow validators.

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::validation::ValidationReport;

pub fn check_exists(report: &mut ValidationReport, path: &Path, label: &str) -> bool {
    let ok = path.exists();
    let detail = if ok {
        String::new()
    } else {
        format!("{} not found", path.display())
    };
    report.add(label, ok, detail)
}

pub fn check_is_file(report: &mut ValidationReport, path: &Path, label: &str) -> bool {
    let ok = path.is_file();
    let detail = if ok {
        String::new()
    } else {
        format!("{} is not a file", path.display())
    };
    report.add(label, ok, detail)
}

pub fn check_is_dir(report: &mut ValidationReport, path: &Path, label: &str) -> bool {
    let ok = path.is_dir();
    let detail = if ok {
        String::new()
    } else {
        format!("{} is not a directory", path.display())
    };
    report.add(label, ok, detail)
}

/// Paths in `dir` matching the shell pattern `pattern`, sorted. The check
/// fails when fewer than `min_count` match.
pub fn check_glob_matches(
    report: &mut ValidationReport,
    dir: &Path,
    pattern: &str,
    min_count: usize,
    label: &str,
) -> Vec<PathBuf> {
    let found = glob_in(dir, pattern);
    let ok = found.len() >= min_count;
    let detail = if ok {
        String::new()
    } else {
        format!("found {} matching {pattern}, expected >= {min_count}", found.len())
    };
    report.add(label, ok, detail);
    found
}

/// Paths in `dir` matching `pattern`; empty when the pattern is invalid.
pub fn glob_in(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let full = format!(
        "{}/{pattern}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let Ok(paths) = glob::glob(&full) else {
        tracing::warn!(pattern = %full, "Invalid glob pattern");
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    found.sort();
    found
}

/// One check covering every YAML file below `dir`; fails listing the files
/// that do not parse.
pub fn validate_all_yaml_in_dir(report: &mut ValidationReport, dir: &Path) -> bool {
    if !dir.is_dir() {
        return true;
    }
    let broken: Vec<String> = files_below(dir, is_yaml_name)
        .into_iter()
        .filter(|path| load_yaml(path).is_err())
        .map(|path| {
            path.strip_prefix(dir)
                .unwrap_or(&path)
                .display()
                .to_string()
        })
        .collect();
    let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("directory");
    let ok = broken.is_empty();
    report.add(
        format!("all YAML in {name}/ parses"),
        ok,
        if ok {
            String::new()
        } else {
            format!("parse errors in {}", broken.join(", "))
        },
    )
}

/// Parse a YAML file. Returns the document when it is a mapping; the check
/// fails for unreadable files, syntax errors and non-mapping documents.
pub fn check_valid_yaml(report: &mut ValidationReport, path: &Path, label: &str) -> Option<Value> {
    match load_yaml(path) {
        Ok(Value::Mapping(map)) => {
            report.pass(label);
            Some(Value::Mapping(map))
        }
        Ok(Value::Null) => {
            report.add(label, false, "document is empty");
            None
        }
        Ok(_) => {
            report.add(label, false, "top-level value is not a mapping");
            None
        }
        Err(detail) => {
            report.add(label, false, detail);
            None
        }
    }
}

pub fn load_yaml(path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    let doc: Option<Value> =
        serde_yaml::from_str(&content).map_err(|e| format!("parse failed: {e}"))?;
    Ok(doc.unwrap_or(Value::Null))
}

/// Entries directly inside `dir` whose file name satisfies `pred`, sorted.
pub fn children_matching(dir: &Path, pred: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = read
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_str().map(&pred).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// Files anywhere below `dir` whose file name satisfies `pred`, in walk order.
pub fn files_below(dir: &Path, pred: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_str().map(&pred).unwrap_or(false))
        .map(|e| e.into_path())
        .collect()
}

/// Paths anywhere below `dir` (files or directories) whose name satisfies `pred`.
pub fn paths_below(dir: &Path, pred: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_str().map(&pred).unwrap_or(false))
        .map(|e| e.into_path())
        .collect()
}

pub fn is_yaml_name(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

/// Sequence at `key` of a mapping, empty when absent or not a list.
pub fn list_at<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Type name used in check details.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// Number of mapping entries whose `source` contains one of `needles` (case-insensitive).
pub fn count_with_source(entries: &[Value], needles: &[&str]) -> usize {
    entries
        .iter()
        .filter(|e| {
            let source = e
                .get("source")
                .map(crate::domain::validation::render)
                .unwrap_or_default()
                .to_lowercase();
            e.is_mapping() && needles.iter().any(|n| source.contains(n))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_yaml_requires_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.yml");
        let list = dir.path().join("list.yml");
        let broken = dir.path().join("broken.yml");
        std::fs::write(&good, "a: 1\n").unwrap();
        std::fs::write(&list, "- 1\n").unwrap();
        std::fs::write(&broken, "a: [1,\n").unwrap();

        let mut report = ValidationReport::new("yaml");
        assert!(check_valid_yaml(&mut report, &good, "good").is_some());
        assert!(check_valid_yaml(&mut report, &list, "list").is_none());
        assert!(check_valid_yaml(&mut report, &broken, "broken").is_none());
        assert!(check_valid_yaml(&mut report, &dir.path().join("absent.yml"), "absent").is_none());
        assert_eq!(report.passed_count(), 1);
        assert!(report.check("broken").unwrap().detail.starts_with("parse failed"));
    }

    #[test]
    fn children_and_descendants() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pm/personas")).unwrap();
        std::fs::write(dir.path().join("prd-v1.md"), "x").unwrap();
        std::fs::write(dir.path().join("pm/personas/dev-persona.yml"), "name: a\n").unwrap();

        assert_eq!(children_matching(dir.path(), |n| n.contains("prd")).len(), 1);
        assert_eq!(files_below(dir.path(), |n| n.contains("persona")).len(), 1);
        // directory names match too
        assert_eq!(paths_below(dir.path(), |n| n.contains("persona")).len(), 2);
    }

    #[test]
    fn glob_matches_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["ST-001.yml", "ST-002.yml", "ST-003.md", "notes.yml"] {
            std::fs::write(dir.path().join(name), "id: x\n").unwrap();
        }

        let mut report = ValidationReport::new("glob");
        let found = check_glob_matches(&mut report, dir.path(), "ST-*.yml", 2, "two stories");
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("ST-001.yml"));
        let designs = check_glob_matches(&mut report, dir.path(), "*-design.md", 1, "designs");
        assert!(designs.is_empty());
        assert_eq!(
            report.check("designs").unwrap().detail,
            "found 0 matching *-design.md, expected >= 1"
        );
        assert_eq!(report.passed_count(), 1);
    }

    #[test]
    fn yaml_sweep_names_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("stories/ST-001")).unwrap();
        std::fs::write(dir.path().join("stories/ST-001.yml"), "id: ST-001\n").unwrap();
        std::fs::write(dir.path().join("stories/ST-001/handoff.yml"), "a: [1,\n").unwrap();

        let mut report = ValidationReport::new("sweep");
        assert!(!validate_all_yaml_in_dir(&mut report, &dir.path().join("stories")));
        let check = report.check("all YAML in stories/ parses").unwrap();
        assert!(check.detail.contains("handoff.yml"));
    }

    #[test]
    fn source_matching_is_case_insensitive() {
        let entries: Vec<Value> = serde_yaml::from_str(
            "- {source: 'PM-workflow'}\n- {source: dev}\n- plain\n",
        )
        .unwrap();
        assert_eq!(count_with_source(&entries, &["pm"]), 1);
        assert_eq!(count_with_source(&entries, &["bug"]), 0);
    }
}
