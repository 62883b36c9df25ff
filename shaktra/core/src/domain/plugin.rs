// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plugin Registry Types
//!
//! Shapes of the JSON files the host keeps under its plugins directory
//! (`installed_plugins.json`, `known_marketplaces.json`, and the
//! `.claude-plugin/*.json` manifests inside a plugin or marketplace clone).
//! Only the fields the updater reads are typed; everything else is carried
//! through untouched as `serde_json::Value`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PLUGIN_NAME: &str = "shaktra";
pub const RELEASE_REF: &str = "origin/release";
pub const MANIFEST_DIR: &str = ".claude-plugin";

/// `.claude-plugin/plugin.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: String,
}

/// `.claude-plugin/marketplace.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketplaceManifest {
    #[serde(default)]
    pub plugins: Vec<MarketplacePlugin>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketplacePlugin {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
}

impl MarketplaceManifest {
    /// Relative source directory of `name`, with any leading `./` removed.
    ///
    /// A source of `./` yields an empty string: the plugin lives at the
    /// root of the marketplace clone.
    pub fn source_of(&self, name: &str) -> Option<String> {
        self.plugins
            .iter()
            .find(|p| p.name == name)
            .filter(|p| !p.source.is_empty())
            .map(|p| p.source.trim_start_matches(['.', '/']).to_string())
    }
}

/// `known_marketplaces.json`: marketplace name → clone metadata
pub type KnownMarketplaces = BTreeMap<String, KnownMarketplace>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownMarketplace {
    #[serde(default)]
    pub install_location: String,
}

/// One element of a `plugins.<name@marketplace>` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallEntry {
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default)]
    pub install_path: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub git_commit_sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<Value>,
}

fn default_scope() -> String {
    "local".to_string()
}

impl Default for InstallEntry {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            install_path: String::new(),
            version: String::new(),
            installed_at: None,
            last_updated: None,
            git_commit_sha: String::new(),
            project_path: None,
        }
    }
}

impl InstallEntry {
    /// Best-effort view of a raw entry. Fields with the wrong type fall
    /// back to their defaults one by one.
    fn from_raw(raw: &Value) -> Self {
        if let Ok(entry) = serde_json::from_value(raw.clone()) {
            return entry;
        }
        tracing::warn!(entry = %raw, "Malformed install entry, reading fields individually");
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        let defaults = Self::default();
        Self {
            scope: text("scope").unwrap_or(defaults.scope),
            install_path: text("installPath").unwrap_or_default(),
            version: text("version").unwrap_or_default(),
            installed_at: text("installedAt"),
            last_updated: text("lastUpdated"),
            git_commit_sha: text("gitCommitSha").unwrap_or_default(),
            project_path: raw.get("projectPath").filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// `installed_plugins.json`, kept as the raw document so key order and
/// unknown fields survive a rewrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstalledPlugins(serde_json::Map<String, Value>);

impl InstalledPlugins {
    /// Top-level field of the registry document
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// First `shaktra@<marketplace>` key, in file order, with a non-empty
    /// entry list.
    pub fn find_install(&self) -> Option<(String, InstallEntry)> {
        let prefix = format!("{PLUGIN_NAME}@");
        let plugins = self.0.get("plugins")?.as_object()?;
        plugins.iter().find_map(|(key, entries)| {
            if !key.starts_with(&prefix) {
                return None;
            }
            let first = entries.as_array()?.first()?;
            Some((key.clone(), InstallEntry::from_raw(first)))
        })
    }

    /// Replace the entry list of `key` with `[entry]`, keeping its position.
    pub fn replace_install(
        &mut self,
        key: &str,
        entry: &InstallEntry,
    ) -> Result<(), serde_json::Error> {
        let value = Value::Array(vec![serde_json::to_value(entry)?]);
        let plugins = self
            .0
            .entry("plugins")
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !plugins.is_object() {
            *plugins = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = plugins {
            map.insert(key.to_string(), value);
        }
        Ok(())
    }
}

/// Marketplace name from an install key (`shaktra@acme` → `acme`).
pub fn marketplace_name(install_key: &str) -> Option<&str> {
    install_key
        .split_once('@')
        .map(|(_, name)| name)
        .filter(|name| !name.is_empty())
}

/// Version-control operations the updater needs on a marketplace clone.
///
/// Isolates the updater from the `git` binary so the update flow can be
/// exercised against plain directories in tests.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// `git fetch origin`
    async fn fetch(&self, repo: &Path) -> anyhow::Result<()>;

    /// `git reset --hard <rev>`
    async fn reset_hard(&self, repo: &Path, rev: &str) -> anyhow::Result<()>;

    /// `git rev-parse HEAD`
    async fn head_sha(&self, repo: &Path) -> anyhow::Result<String>;

    /// Contents of `path` at `rev` without touching the work tree
    async fn show_file(&self, repo: &Path, rev: &str, path: &str) -> anyhow::Result<String>;
}

/// Record printed by `shaktra update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated {
        old_version: String,
        new_version: String,
        restart_required: bool,
    },
    UpToDate {
        version: String,
    },
    Error {
        message: String,
    },
}

impl From<PluginUpdateError> for UpdateOutcome {
    fn from(err: PluginUpdateError) -> Self {
        UpdateOutcome::Error {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PluginUpdateError {
    #[error("plugin.json not found")]
    LocalManifestMissing,

    #[error("Shaktra not found in installed_plugins.json")]
    NotInstalled,

    #[error("Cannot determine marketplace name")]
    MarketplaceUnknown,

    #[error("Marketplace '{0}' clone not found")]
    CloneMissing(String),

    #[error("Failed to fetch latest from marketplace")]
    FetchFailed,

    #[error("marketplace.json not found in clone")]
    MarketplaceManifestMissing,

    #[error("Shaktra not found in marketplace.json")]
    NotInMarketplace,

    #[error("plugin.json not found in fetched source")]
    SourceManifestMissing,

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
