// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Workflow Validation Reports
//!
//! A workflow run leaves artifacts under `.shaktra/`; validators inspect them
//! and record one [`CheckResult`] per expectation. Checks never abort a
//! report, so a single run lists every missing or malformed artifact.
//!
//! Field checks address YAML data with dotted paths (`plan_summary.components`).

use serde::Serialize;
use serde_yaml::Value;

/// Outcome of a single expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

/// All checks performed for one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub name: String,
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    /// Record a check and hand its outcome back to the caller.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
    ) -> bool {
        self.checks.push(CheckResult {
            name: name.into(),
            passed,
            detail: detail.into(),
        });
        passed
    }

    pub fn pass(&mut self, name: impl Into<String>) -> bool {
        self.add(name, true, "")
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.len() - self.passed_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Process exit code for the harness: 0 when every check passed.
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

/// Look up a dotted path in YAML data.
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |node, key| node.as_mapping()?.get(key))
}

/// Truthiness of a YAML value: null, false, zero, and empty
/// strings/sequences/mappings are empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

/// Compact single-line rendering for check details.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{:?}", other)),
    }
}

fn field_label(label: Option<&str>, default: impl FnOnce() -> String) -> String {
    label.map(str::to_string).unwrap_or_else(default)
}

pub fn check_field_exists(
    report: &mut ValidationReport,
    data: &Value,
    path: &str,
    label: Option<&str>,
) -> bool {
    let found = lookup(data, path).is_some();
    report.add(
        field_label(label, || format!("{path} exists")),
        found,
        if found { String::new() } else { format!("missing field '{path}'") },
    )
}

pub fn check_field_nonempty(
    report: &mut ValidationReport,
    data: &Value,
    path: &str,
    label: Option<&str>,
) -> bool {
    let ok = lookup(data, path).map(is_truthy).unwrap_or(false);
    report.add(
        field_label(label, || format!("{path} non-empty")),
        ok,
        if ok { String::new() } else { format!("'{path}' missing or empty") },
    )
}

pub fn check_field_equals(
    report: &mut ValidationReport,
    data: &Value,
    path: &str,
    expected: impl Into<Value>,
    label: Option<&str>,
) -> bool {
    let expected = expected.into();
    let actual = lookup(data, path);
    let ok = actual == Some(&expected);
    let detail = match actual {
        _ if ok => String::new(),
        Some(v) => format!("expected {}, got {}", render(&expected), render(v)),
        None => format!("missing field '{path}'"),
    };
    report.add(
        field_label(label, || format!("{path} == {}", render(&expected))),
        ok,
        detail,
    )
}

pub fn check_field_in(
    report: &mut ValidationReport,
    data: &Value,
    path: &str,
    allowed: &[&str],
    label: Option<&str>,
) -> bool {
    let actual = lookup(data, path);
    let ok = actual
        .and_then(Value::as_str)
        .map(|s| allowed.contains(&s))
        .unwrap_or(false);
    let detail = match actual {
        _ if ok => String::new(),
        Some(v) => format!("got {}, expected one of {:?}", render(v), allowed),
        None => format!("missing field '{path}'"),
    };
    report.add(field_label(label, || format!("{path} in {:?}", allowed)), ok, detail)
}

/// Numeric variant of [`check_field_in`].
pub fn check_field_in_numbers(
    report: &mut ValidationReport,
    data: &Value,
    path: &str,
    allowed: &[i64],
    label: Option<&str>,
) -> bool {
    let actual = lookup(data, path);
    let ok = actual
        .and_then(Value::as_f64)
        .map(|n| allowed.iter().any(|a| *a as f64 == n))
        .unwrap_or(false);
    let detail = match actual {
        _ if ok => String::new(),
        Some(v) => format!("got {}, expected one of {:?}", render(v), allowed),
        None => format!("missing field '{path}'"),
    };
    report.add(field_label(label, || format!("{path} in {:?}", allowed)), ok, detail)
}

/// The value at `path` is a list with at least `min` items.
pub fn check_list_min_length(
    report: &mut ValidationReport,
    data: &Value,
    path: &str,
    min: usize,
    label: Option<&str>,
) -> bool {
    let actual = lookup(data, path);
    let ok = actual
        .and_then(Value::as_sequence)
        .map(|seq| seq.len() >= min)
        .unwrap_or(false);
    let detail = match actual {
        _ if ok => String::new(),
        Some(Value::Sequence(seq)) => format!("got {} items, expected >= {min}", seq.len()),
        Some(v) => format!("'{path}' is not a list: {}", render(v)),
        None => format!("missing field '{path}'"),
    };
    report.add(field_label(label, || format!("{path} has >= {min} items")), ok, detail)
}

pub fn check_field_gte(
    report: &mut ValidationReport,
    data: &Value,
    path: &str,
    min: f64,
    label: Option<&str>,
) -> bool {
    let actual = lookup(data, path);
    let ok = actual.and_then(Value::as_f64).map(|n| n >= min).unwrap_or(false);
    let detail = match actual {
        _ if ok => String::new(),
        Some(v) => format!("got {}, expected >= {min}", render(v)),
        None => format!("missing field '{path}'"),
    };
    report.add(field_label(label, || format!("{path} >= {min}")), ok, detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handoff() -> Value {
        serde_yaml::from_str(
            r#"
story_id: ST-001
current_phase: code
completed_phases: [plan, tests]
plan_summary:
  components: [UserService]
  test_plan: {}
test_summary:
  test_count: 4
code_summary:
  all_tests_green: true
"#,
        )
        .unwrap()
    }

    #[test]
    fn dotted_lookup() {
        let data = handoff();
        assert_eq!(lookup(&data, "test_summary.test_count"), Some(&Value::from(4)));
        assert!(lookup(&data, "plan_summary.missing").is_none());
        assert!(lookup(&data, "story_id.deeper").is_none());
    }

    #[test]
    fn field_checks_record_outcomes() {
        let data = handoff();
        let mut report = ValidationReport::new("dev");

        assert!(check_field_equals(&mut report, &data, "story_id", "ST-001", None));
        assert!(check_field_equals(
            &mut report,
            &data,
            "code_summary.all_tests_green",
            true,
            Some("all tests green")
        ));
        assert!(check_field_in(&mut report, &data, "current_phase", &["plan", "code"], None));
        assert!(check_field_gte(&mut report, &data, "test_summary.test_count", 1.0, None));
        assert!(!check_field_nonempty(&mut report, &data, "plan_summary.test_plan", None));
        assert!(!check_field_exists(&mut report, &data, "memory_captured", None));

        assert_eq!(report.passed_count(), 4);
        assert_eq!(report.failed_count(), 2);
        assert!(!report.passed());
        assert_eq!(report.exit_code(), 1);
        assert!(report.check("all tests green").unwrap().passed);
        assert_eq!(
            report.check("memory_captured exists").unwrap().detail,
            "missing field 'memory_captured'"
        );
    }

    #[test]
    fn list_length_and_numeric_membership() {
        let data: Value = serde_yaml::from_str(
            "timeline: [a, b]\nimpact: high\nmetadata:\n  story_points: 5\n  other: 4\n",
        )
        .unwrap();
        let mut report = ValidationReport::new("lists");

        assert!(check_list_min_length(&mut report, &data, "timeline", 1, None));
        let three = Some("three events");
        assert!(!check_list_min_length(&mut report, &data, "timeline", 3, three));
        assert!(!check_list_min_length(&mut report, &data, "impact", 1, Some("impact list")));
        assert!(!check_list_min_length(&mut report, &data, "action_items", 1, Some("actions")));
        let points = [1, 2, 3, 5, 8];
        let other = Some("other");
        assert!(check_field_in_numbers(&mut report, &data, "metadata.story_points", &points, None));
        assert!(!check_field_in_numbers(&mut report, &data, "metadata.other", &points, other));

        let detail = |name: &str| report.check(name).unwrap().detail.clone();
        assert_eq!(detail("three events"), "got 2 items, expected >= 3");
        assert_eq!(detail("impact list"), "'impact' is not a list: high");
        assert_eq!(detail("actions"), "missing field 'action_items'");
        assert_eq!(detail("other"), "got 4, expected one of [1, 2, 3, 5, 8]");
    }

    #[test]
    fn equals_reports_mismatch() {
        let data = handoff();
        let mut report = ValidationReport::new("dev");
        check_field_equals(&mut report, &data, "story_id", "ST-002", None);
        assert_eq!(report.checks[0].detail, "expected ST-002, got ST-001");
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&Value::from(0)));
        assert!(!is_truthy(&Value::from("")));
        assert!(is_truthy(&Value::from("x")));
        assert!(is_truthy(&serde_yaml::from_str::<Value>("[1]").unwrap()));
    }

    #[test]
    fn empty_report_passes() {
        let report = ValidationReport::new("noop");
        assert!(report.passed());
        assert_eq!(report.exit_code(), 0);
    }
}
