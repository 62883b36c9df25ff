// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Legacy decisions/lessons migration against a project on disk.

use shaktra_core::application::MemoryMigrationService;
use shaktra_core::domain::principle::{MigrationError, Principle};

#[derive(serde::Deserialize)]
struct PrinciplesFile {
    principles: Vec<Principle>,
}

fn project_with(decisions: Option<&str>, lessons: Option<&str>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let memory = dir.path().join(".shaktra/memory");
    std::fs::create_dir_all(&memory).unwrap();
    if let Some(yaml) = decisions {
        std::fs::write(memory.join("decisions.yml"), yaml).unwrap();
    }
    if let Some(yaml) = lessons {
        std::fs::write(memory.join("lessons.yml"), yaml).unwrap();
    }
    dir
}

const DECISIONS: &str = r#"
decisions:
  - id: DC-001
    title: Use JWT
    summary: Authenticate API calls with short-lived JWTs
    categories: [security, performance]
    guidance: [Rotate signing keys monthly]
    status: active
    created: "2025-11-02"
  - id: 7
    title: Prefer composition
    categories: [maintainability]
    status: superseded
    supersedes: DC-001
"#;

const LESSONS: &str = r#"
lessons:
  - id: LS-003
    insight: Fixtures drift from schema
    action: Regenerate fixtures from migrations
    source: ST-014
    date: "2025-12-01"
  - insight: Flaky tests hide real failures
    action: Quarantine and fix within a sprint
"#;

#[test]
fn test_decisions_then_lessons_share_one_sequence() {
    let dir = project_with(Some(DECISIONS), Some(LESSONS));
    let summary = MemoryMigrationService::new(dir.path())
        .with_today("2026-10-18")
        .migrate()
        .unwrap();

    assert_eq!(summary.decisions_migrated, 2);
    assert_eq!(summary.lessons_migrated, 2);
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.backups.len(), 2);

    let content = std::fs::read_to_string(&summary.principles_path).unwrap();
    assert!(content.starts_with(
        "# Project principles \u{2014} synthesized from observations\n\
         # Migrated from decisions.yml and lessons.yml\n"
    ));
    let file: PrinciplesFile = serde_yaml::from_str(&content).unwrap();
    let ids: Vec<&str> = file.principles.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["PR-001", "PR-002", "PR-003", "PR-004"]);

    let jwt = &file.principles[0];
    assert_eq!(jwt.text, "Authenticate API calls with short-lived JWTs");
    assert_eq!(jwt.source, "migrated:DC-001");
    assert_eq!(jwt.confidence, 0.7);
    assert_eq!(jwt.roles, vec!["architect", "developer", "sw-engineer", "sw-quality"]);
    assert_eq!(jwt.created, "2025-11-02");

    let composition = &file.principles[1];
    assert_eq!(composition.text, "Prefer composition");
    assert_eq!(composition.source, "migrated:DC-7");
    assert_eq!(composition.status, "superseded");
    assert_eq!(composition.supersedes.as_deref(), Some("PR-001"));
    assert_eq!(composition.created, "2026-10-18");

    let fixtures = &file.principles[2];
    assert_eq!(fixtures.source, "migrated:ST-014");
    assert_eq!(fixtures.guidance, vec!["Regenerate fixtures from migrations"]);
    assert_eq!(fixtures.confidence, 0.5);
    assert_eq!(fixtures.roles, vec!["developer"]);

    assert_eq!(file.principles[3].source, "migrated:");
}

#[test]
fn test_legacy_files_are_kept_and_backed_up() {
    let dir = project_with(Some(DECISIONS), None);
    MemoryMigrationService::new(dir.path()).migrate().unwrap();

    let memory = dir.path().join(".shaktra/memory");
    assert!(memory.join("decisions.yml").exists());
    assert_eq!(
        std::fs::read_to_string(memory.join("decisions.yml.bak")).unwrap(),
        DECISIONS
    );
    assert!(!memory.join("lessons.yml.bak").exists());
}

#[test]
fn test_second_run_refuses() {
    let dir = project_with(None, Some(LESSONS));
    let service = MemoryMigrationService::new(dir.path());
    service.migrate().unwrap();

    let err = service.migrate().unwrap_err();
    assert!(matches!(err, MigrationError::AlreadyMigrated(_)));
}

#[test]
fn test_malformed_legacy_file_is_reported() {
    let dir = project_with(Some("decisions: [\n"), None);
    let err = MemoryMigrationService::new(dir.path()).migrate().unwrap_err();
    assert!(matches!(err, MigrationError::Parse { .. }));
    assert!(!dir.path().join(".shaktra/memory/principles.yml").exists());
}
