// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Legacy Memory Migration
//!
//! One-shot conversion of `decisions.yml` and `lessons.yml` into the
//! principles store. Decisions are migrated first, then lessons, with a
//! single running `PR-NNN` sequence across both. The legacy files are kept
//! and copied to `<name>.bak`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::domain::principle::{
    DecisionsFile, LessonsFile, MigrationError, MigrationSummary, Principle,
};

const PRINCIPLES_HEADER: &str = "# Project principles \u{2014} synthesized from observations\n\
# Migrated from decisions.yml and lessons.yml\n";

#[derive(Serialize)]
struct PrinciplesFile<'a> {
    principles: &'a [Principle],
}

pub struct MemoryMigrationService {
    memory_dir: PathBuf,
    today: String,
}

impl MemoryMigrationService {
    /// Migration for the project at `project_root` (`.shaktra/memory` below it).
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            memory_dir: project_root.as_ref().join(".shaktra").join("memory"),
            today: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
        }
    }

    /// Fix the date stamped on records that carry none.
    pub fn with_today(mut self, today: impl Into<String>) -> Self {
        self.today = today.into();
        self
    }

    pub fn memory_dir(&self) -> &Path {
        &self.memory_dir
    }

    pub fn migrate(&self) -> Result<MigrationSummary, MigrationError> {
        let decisions_path = self.memory_dir.join("decisions.yml");
        let lessons_path = self.memory_dir.join("lessons.yml");
        let principles_path = self.memory_dir.join("principles.yml");

        if principles_path.exists() {
            return Err(MigrationError::AlreadyMigrated(principles_path));
        }

        let mut principles: Vec<Principle> = Vec::new();
        let mut backups = Vec::new();

        let decisions = load_legacy::<DecisionsFile>(&decisions_path)?;
        let decisions_migrated = match decisions {
            Some(file) => {
                let count = file.decisions.len();
                for decision in file.decisions {
                    let sequence = principles.len() + 1;
                    principles.push(decision.into_principle(sequence, &self.today));
                }
                backups.push(backup(&decisions_path)?);
                tracing::info!(count, "Migrated decisions to principles");
                count
            }
            None => 0,
        };

        let lessons = load_legacy::<LessonsFile>(&lessons_path)?;
        let lessons_migrated = match lessons {
            Some(file) => {
                let count = file.lessons.len();
                for lesson in file.lessons {
                    let sequence = principles.len() + 1;
                    principles.push(lesson.into_principle(sequence, &self.today));
                }
                backups.push(backup(&lessons_path)?);
                tracing::info!(count, "Migrated lessons to principles");
                count
            }
            None => 0,
        };

        let body = serde_yaml::to_string(&PrinciplesFile {
            principles: &principles,
        })?;
        std::fs::write(&principles_path, format!("{PRINCIPLES_HEADER}{body}")).map_err(|source| {
            MigrationError::Write {
                path: principles_path.clone(),
                source,
            }
        })?;

        Ok(MigrationSummary {
            decisions_migrated,
            lessons_migrated,
            principles_path,
            backups,
        })
    }
}

/// Parse a legacy file; `None` when it does not exist. An empty file parses
/// to the default (no records).
fn load_legacy<T: DeserializeOwned + Default>(path: &Path) -> Result<Option<T>, MigrationError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| MigrationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: Option<T> = serde_yaml::from_str(&content).map_err(|source| MigrationError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(parsed.unwrap_or_default()))
}

fn backup(path: &Path) -> Result<PathBuf, MigrationError> {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    let target = PathBuf::from(name);
    std::fs::copy(path, &target).map_err(|source| MigrationError::Write {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".shaktra/memory")).unwrap();
        dir
    }

    #[test]
    fn refuses_to_overwrite_principles() {
        let dir = project();
        let principles = dir.path().join(".shaktra/memory/principles.yml");
        std::fs::write(&principles, "principles: []\n").unwrap();

        let err = MemoryMigrationService::new(dir.path()).migrate().unwrap_err();
        assert!(matches!(err, MigrationError::AlreadyMigrated(p) if p == principles));
        assert_eq!(std::fs::read_to_string(&principles).unwrap(), "principles: []\n");
    }

    #[test]
    fn no_legacy_files_writes_empty_principles() {
        let dir = project();
        let summary = MemoryMigrationService::new(dir.path()).migrate().unwrap();
        assert_eq!(summary.total(), 0);
        assert!(summary.backups.is_empty());

        let written = std::fs::read_to_string(&summary.principles_path).unwrap();
        assert!(written.starts_with("# Project principles"));
        assert!(written.contains("principles: []"));
    }

    #[test]
    fn empty_legacy_file_is_still_backed_up() {
        let dir = project();
        std::fs::write(dir.path().join(".shaktra/memory/lessons.yml"), "").unwrap();

        let summary = MemoryMigrationService::new(dir.path()).migrate().unwrap();
        assert_eq!(summary.lessons_migrated, 0);
        assert_eq!(summary.backups.len(), 1);
        assert!(dir.path().join(".shaktra/memory/lessons.yml.bak").exists());
    }
}
