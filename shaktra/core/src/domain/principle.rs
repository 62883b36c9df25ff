// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Principle Schema
//!
//! Principles are the current unit of project memory. Older projects kept
//! `decisions.yml` and `lessons.yml` instead; this module holds both shapes
//! and the rules that turn a legacy record into a principle.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Principle model, legacy record model, role inference

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

pub const DECISION_CONFIDENCE: f64 = 0.7;
pub const LESSON_CONFIDENCE: f64 = 0.5;
const FALLBACK_ROLE: &str = "developer";

/// Roles that should see principles of a given quality category.
fn roles_for_category(category: &str) -> &'static [&'static str] {
    match category {
        "correctness" | "reliability" | "compatibility" => &["developer", "sw-engineer"],
        "performance" | "consistency" => &["developer", "sw-engineer", "architect"],
        "security" => &["developer", "sw-engineer", "sw-quality"],
        "maintainability" | "compliance" => &["developer", "sw-quality"],
        "testability" => &["developer", "sw-quality", "test-agent"],
        "observability" | "scalability" => &["developer", "architect"],
        "accessibility" | "usability" => &["developer"],
        "cost" => &["architect"],
        _ => &[FALLBACK_ROLE],
    }
}

/// Union of roles for `categories`, sorted and deduplicated.
pub fn infer_roles<S: AsRef<str>>(categories: &[S]) -> Vec<String> {
    categories
        .iter()
        .flat_map(|c| roles_for_category(c.as_ref()).iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// A principle as written to `principles.yml`. Field order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principle {
    pub id: String,
    pub text: String,
    pub categories: Vec<String>,
    pub guidance: Vec<String>,
    pub confidence: f64,
    pub source_count: u32,
    pub tags: Vec<String>,
    pub roles: Vec<String>,
    pub scope: String,
    pub status: String,
    pub source: String,
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
}

pub fn principle_id(sequence: usize) -> String {
    format!("PR-{sequence:03}")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionsFile {
    #[serde(default)]
    pub decisions: Vec<LegacyDecision>,
}

/// Entry of the legacy `decisions.yml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyDecision {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub guidance: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub supersedes: Option<String>,
    #[serde(default)]
    pub created: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonsFile {
    #[serde(default)]
    pub lessons: Vec<LegacyLesson>,
}

/// Entry of the legacy `lessons.yml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyLesson {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub insight: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub date: Option<Value>,
}

impl LegacyDecision {
    /// Convert to a principle. `sequence` numbers the principle and stands
    /// in for a missing decision id.
    pub fn into_principle(self, sequence: usize, today: &str) -> Principle {
        let source = format!("migrated:DC-{}", self.legacy_id(sequence));
        let supersedes = self.supersedes.map(|s| s.replace("DC-", "PR-"));
        Principle {
            id: principle_id(sequence),
            text: self.summary.or(self.title).unwrap_or_default(),
            roles: infer_roles(&self.categories),
            tags: self.categories.clone(),
            categories: self.categories,
            guidance: self.guidance,
            confidence: DECISION_CONFIDENCE,
            source_count: 1,
            scope: "project".to_string(),
            status: self.status.unwrap_or_else(|| "active".to_string()),
            source,
            created: self.created.as_ref().and_then(scalar).unwrap_or_else(|| today.to_string()),
            supersedes,
        }
    }

    /// Numeric ids are kept as-is; string ids are zero-padded to three
    /// characters with any `DC-` prefix removed.
    fn legacy_id(&self, sequence: usize) -> String {
        match &self.id {
            Some(Value::String(s)) => {
                let bare = s.strip_prefix("DC-").unwrap_or(s);
                format!("{bare:0>3}")
            }
            Some(other) => scalar(other).unwrap_or_else(|| sequence.to_string()),
            None => sequence.to_string(),
        }
    }
}

impl LegacyLesson {
    pub fn into_principle(self, sequence: usize, today: &str) -> Principle {
        let origin = self
            .source
            .or_else(|| self.id.as_ref().and_then(scalar))
            .unwrap_or_default();
        Principle {
            id: principle_id(sequence),
            text: self.insight.unwrap_or_default(),
            categories: Vec::new(),
            guidance: vec![self.action.unwrap_or_default()],
            confidence: LESSON_CONFIDENCE,
            source_count: 1,
            tags: Vec::new(),
            roles: vec![FALLBACK_ROLE.to_string()],
            scope: "project".to_string(),
            status: "active".to_string(),
            source: format!("migrated:{origin}"),
            created: self.date.as_ref().and_then(scalar).unwrap_or_else(|| today.to_string()),
            supersedes: None,
        }
    }
}

/// Render a YAML scalar (string, number, bool) as plain text.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// What a migration run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationSummary {
    pub decisions_migrated: usize,
    pub lessons_migrated: usize,
    pub principles_path: PathBuf,
    pub backups: Vec<PathBuf>,
}

impl MigrationSummary {
    pub fn total(&self) -> usize {
        self.decisions_migrated + self.lessons_migrated
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("principles.yml already exists at {0}. Aborting.")]
    AlreadyMigrated(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid legacy memory file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize principles: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
