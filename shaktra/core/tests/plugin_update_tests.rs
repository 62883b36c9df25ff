// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Plugin update flow against a fake marketplace clone.
//!
//! `FakeGit` models `origin/release` as a separate directory: `show_file`
//! reads from it and `reset_hard` copies it over the clone.

use async_trait::async_trait;
use serde_json::{json, Value};
use shaktra_core::application::PluginUpdater;
use shaktra_core::domain::plugin::{GitClient, UpdateOutcome};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct FakeGit {
    release: PathBuf,
    fail_fetch: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    fn new(release: &Path) -> Self {
        Self {
            release: release.to_path_buf(),
            fail_fetch: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl GitClient for FakeGit {
    async fn fetch(&self, _repo: &Path) -> anyhow::Result<()> {
        self.record("fetch");
        if self.fail_fetch {
            anyhow::bail!("could not resolve host");
        }
        Ok(())
    }

    async fn reset_hard(&self, repo: &Path, rev: &str) -> anyhow::Result<()> {
        self.record(&format!("reset {rev}"));
        for entry in walkdir::WalkDir::new(&self.release) {
            let entry = entry?;
            let target = repo.join(entry.path().strip_prefix(&self.release)?);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    async fn head_sha(&self, _repo: &Path) -> anyhow::Result<String> {
        Ok("abc123".to_string())
    }

    async fn show_file(&self, _repo: &Path, rev: &str, path: &str) -> anyhow::Result<String> {
        self.record(&format!("show {rev}:{path}"));
        Ok(std::fs::read_to_string(self.release.join(path))?)
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    plugin_root: PathBuf,
    plugins_dir: PathBuf,
    release: PathBuf,
    clone: PathBuf,
}

fn write_json(path: &Path, value: Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn fixture(local_version: &str, remote_version: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let plugin_root = dir.path().join("installed");
    let plugins_dir = dir.path().join("plugins");
    let release = dir.path().join("release");
    let clone = plugins_dir.join("marketplaces").join("acme");

    write_json(
        &plugin_root.join(".claude-plugin/plugin.json"),
        json!({"name": "shaktra", "version": local_version}),
    );
    write_json(
        &release.join(".claude-plugin/marketplace.json"),
        json!({"name": "acme", "plugins": [{"name": "shaktra", "source": "./dist"}]}),
    );
    write_json(
        &release.join("dist/.claude-plugin/plugin.json"),
        json!({"name": "shaktra", "version": remote_version}),
    );
    std::fs::write(release.join("dist/README.md"), "# Shaktra\n").unwrap();
    std::fs::create_dir_all(&clone).unwrap();

    write_json(
        &plugins_dir.join("installed_plugins.json"),
        json!({
            "version": 2,
            "plugins": {
                "other@acme": [{"version": "9.9.9"}],
                "shaktra@acme": [{
                    "scope": "user",
                    "installPath": plugin_root.display().to_string(),
                    "version": local_version,
                    "installedAt": "2026-01-01T00:00:00.000Z",
                    "gitCommitSha": "old"
                }]
            }
        }),
    );
    write_json(
        &plugins_dir.join("known_marketplaces.json"),
        json!({"acme": {"installLocation": clone.display().to_string()}}),
    );

    Fixture {
        _dir: dir,
        plugin_root,
        plugins_dir,
        release,
        clone,
    }
}

fn registry(f: &Fixture) -> Value {
    let text = std::fs::read_to_string(f.plugins_dir.join("installed_plugins.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_newer_release_is_installed_into_cache() {
    let f = fixture("0.3.0", "0.4.0");
    let git = FakeGit::new(&f.release);
    let updater = PluginUpdater::new(git, &f.plugins_dir);

    let outcome = updater.run(&f.plugin_root, false).await;
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            old_version: "0.3.0".to_string(),
            new_version: "0.4.0".to_string(),
            restart_required: true,
        }
    );

    let cache = f.plugins_dir.join("cache/acme/shaktra/0.4.0");
    assert_eq!(std::fs::read_to_string(cache.join("README.md")).unwrap(), "# Shaktra\n");
    assert!(f.clone.join("dist/.claude-plugin/plugin.json").exists());

    let reg = registry(&f);
    let entry = &reg["plugins"]["shaktra@acme"][0];
    assert_eq!(entry["version"], "0.4.0");
    assert_eq!(entry["scope"], "user");
    assert_eq!(entry["installPath"], cache.display().to_string());
    assert_eq!(entry["installedAt"], "2026-01-01T00:00:00.000Z");
    assert_eq!(entry["gitCommitSha"], "abc123");
    assert!(entry["lastUpdated"].as_str().unwrap().ends_with(".000Z"));
    assert!(entry.get("projectPath").is_none());

    // unrelated keys survive the rewrite
    assert_eq!(reg["version"], 2);
    assert_eq!(reg["plugins"]["other@acme"][0]["version"], "9.9.9");
}

#[tokio::test]
async fn test_same_version_is_up_to_date_without_reset() {
    let f = fixture("0.4.0", "0.4.0");
    let updater = PluginUpdater::new(FakeGit::new(&f.release), &f.plugins_dir);

    let outcome = updater.run(&f.plugin_root, false).await;
    assert_eq!(outcome, UpdateOutcome::UpToDate { version: "0.4.0".to_string() });
    assert!(!f.plugins_dir.join("cache").exists());
}

#[tokio::test]
async fn test_force_skips_version_check() {
    let f = fixture("0.4.0", "0.4.0");
    let git = FakeGit::new(&f.release);
    let updater = PluginUpdater::new(git, &f.plugins_dir);

    let outcome = updater.run(&f.plugin_root, true).await;
    assert!(matches!(outcome, UpdateOutcome::Updated { .. }));
}

#[tokio::test]
async fn test_git_call_sequence() {
    let f = fixture("0.3.0", "0.4.0");
    let git = std::sync::Arc::new(FakeGit::new(&f.release));
    let updater = PluginUpdater::new(SharedGit(git.clone()), &f.plugins_dir);

    updater.update(&f.plugin_root, false).await.unwrap();
    assert_eq!(
        git.calls(),
        vec![
            "fetch",
            "show origin/release:.claude-plugin/marketplace.json",
            "show origin/release:dist/.claude-plugin/plugin.json",
            "reset origin/release",
        ]
    );
}

struct SharedGit(std::sync::Arc<FakeGit>);

#[async_trait]
impl GitClient for SharedGit {
    async fn fetch(&self, repo: &Path) -> anyhow::Result<()> {
        self.0.fetch(repo).await
    }
    async fn reset_hard(&self, repo: &Path, rev: &str) -> anyhow::Result<()> {
        self.0.reset_hard(repo, rev).await
    }
    async fn head_sha(&self, repo: &Path) -> anyhow::Result<String> {
        self.0.head_sha(repo).await
    }
    async fn show_file(&self, repo: &Path, rev: &str, path: &str) -> anyhow::Result<String> {
        self.0.show_file(repo, rev, path).await
    }
}

#[test]
fn test_fetch_failure_is_reported_as_error_record() {
    let f = fixture("0.3.0", "0.4.0");
    let mut git = FakeGit::new(&f.release);
    git.fail_fetch = true;
    let updater = PluginUpdater::new(git, &f.plugins_dir);

    let outcome = tokio_test::block_on(updater.run(&f.plugin_root, false));
    assert_eq!(
        outcome,
        UpdateOutcome::Error {
            message: "Failed to fetch latest from marketplace".to_string()
        }
    );
    assert_eq!(registry(&f)["plugins"]["shaktra@acme"][0]["version"], "0.3.0");
}

#[tokio::test]
async fn test_missing_install_and_clone_errors() {
    let f = fixture("0.3.0", "0.4.0");
    write_json(&f.plugins_dir.join("installed_plugins.json"), json!({"plugins": {}}));
    let updater = PluginUpdater::new(FakeGit::new(&f.release), &f.plugins_dir);
    assert_eq!(
        updater.run(&f.plugin_root, false).await,
        UpdateOutcome::Error {
            message: "Shaktra not found in installed_plugins.json".to_string()
        }
    );

    let f = fixture("0.3.0", "0.4.0");
    std::fs::remove_dir_all(&f.clone).unwrap();
    let updater = PluginUpdater::new(FakeGit::new(&f.release), &f.plugins_dir);
    assert_eq!(
        updater.run(&f.plugin_root, false).await,
        UpdateOutcome::Error {
            message: "Marketplace 'acme' clone not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_local_manifest() {
    let f = fixture("0.3.0", "0.4.0");
    let updater = PluginUpdater::new(FakeGit::new(&f.release), &f.plugins_dir);
    let outcome = updater.run(&f.plugins_dir.join("nowhere"), false).await;
    assert_eq!(
        outcome,
        UpdateOutcome::Error {
            message: "plugin.json not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_plugin_at_marketplace_root() {
    let f = fixture("0.3.0", "0.4.0");
    std::fs::remove_dir_all(&f.release).unwrap();
    write_json(
        &f.release.join(".claude-plugin/marketplace.json"),
        json!({"name": "acme", "plugins": [{"name": "shaktra", "source": "./"}]}),
    );
    write_json(
        &f.release.join(".claude-plugin/plugin.json"),
        json!({"name": "shaktra", "version": "0.4.0"}),
    );
    let git = std::sync::Arc::new(FakeGit::new(&f.release));
    let updater = PluginUpdater::new(SharedGit(git.clone()), &f.plugins_dir);

    let outcome = updater.run(&f.plugin_root, false).await;
    assert!(matches!(
        outcome,
        UpdateOutcome::Updated { ref new_version, .. } if new_version == "0.4.0"
    ));
    assert!(git
        .calls()
        .contains(&"show origin/release:.claude-plugin/plugin.json".to_string()));
    let cache = f.plugins_dir.join("cache/acme/shaktra/0.4.0");
    assert!(cache.join(".claude-plugin/plugin.json").exists());
}

#[tokio::test]
async fn test_registry_rewrite_keeps_key_order() {
    let f = fixture("0.3.0", "0.4.0");
    let updater = PluginUpdater::new(FakeGit::new(&f.release), &f.plugins_dir);
    updater.run(&f.plugin_root, false).await;

    let text = std::fs::read_to_string(f.plugins_dir.join("installed_plugins.json")).unwrap();
    let version = text.find("\"version\": 2").unwrap();
    let plugins = text.find("\"plugins\"").unwrap();
    let other = text.find("other@acme").unwrap();
    let shaktra = text.find("shaktra@acme").unwrap();
    assert!(version < plugins && plugins < other && other < shaktra);
}
