// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plugin Update Use Case
//!
//! Refreshes the installed Shaktra plugin from the marketplace clone it was
//! installed from.
//!
//! # Flow
//!
//! ```text
//! plugin.json (local version)
//!   → installed_plugins.json (shaktra@<marketplace>)
//!   → known_marketplaces.json (clone location)
//!   → git fetch origin
//!   → [unless forced] compare remote plugin.json version
//!   → git reset --hard origin/release
//!   → copy source into cache/<marketplace>/shaktra/<version>
//!   → rewrite installed_plugins.json entry
//! ```
//!
//! Every failure maps to a [`PluginUpdateError`] whose message is reported
//! to the caller as an `error` record.

use std::path::{Path, PathBuf};

use crate::domain::plugin::{
    marketplace_name, GitClient, InstallEntry, InstalledPlugins, KnownMarketplaces,
    MarketplaceManifest, PluginManifest, PluginUpdateError, UpdateOutcome, MANIFEST_DIR,
    PLUGIN_NAME, RELEASE_REF,
};
use crate::infrastructure::plugin_files::{
    copy_tree, parse_json, read_json, remove_tree, write_json,
};

/// Timestamp format used by the host for install records
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

pub struct PluginUpdater<G: GitClient> {
    git: G,
    plugins_dir: PathBuf,
}

impl<G: GitClient> PluginUpdater<G> {
    pub fn new(git: G, plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            git,
            plugins_dir: plugins_dir.into(),
        }
    }

    /// Run the update and fold any failure into an `error` outcome.
    pub async fn run(&self, plugin_root: &Path, force: bool) -> UpdateOutcome {
        match self.update(plugin_root, force).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Plugin update failed");
                e.into()
            }
        }
    }

    pub async fn update(
        &self,
        plugin_root: &Path,
        force: bool,
    ) -> Result<UpdateOutcome, PluginUpdateError> {
        let local_manifest = plugin_root.join(MANIFEST_DIR).join("plugin.json");
        if !local_manifest.exists() {
            return Err(PluginUpdateError::LocalManifestMissing);
        }
        let local_version = read_json::<PluginManifest>(&local_manifest)?.version;

        let registry_path = self.plugins_dir.join("installed_plugins.json");
        let mut registry: InstalledPlugins = if registry_path.exists() {
            read_json(&registry_path)?
        } else {
            InstalledPlugins::default()
        };
        let (install_key, install_entry) = registry
            .find_install()
            .ok_or(PluginUpdateError::NotInstalled)?;
        let mkt_name = marketplace_name(&install_key)
            .ok_or(PluginUpdateError::MarketplaceUnknown)?
            .to_string();

        let clone = self.find_clone(&mkt_name)?;
        tracing::info!(marketplace = %mkt_name, clone = %clone.display(), "Updating plugin");

        self.git.fetch(&clone).await.map_err(|e| {
            tracing::warn!(error = %e, "git fetch failed");
            PluginUpdateError::FetchFailed
        })?;

        if !force {
            match self.remote_version(&clone).await {
                Some(remote) if remote == local_version => {
                    tracing::info!(version = %local_version, "Plugin already up to date");
                    return Ok(UpdateOutcome::UpToDate { version: local_version });
                }
                Some(remote) => tracing::info!(local = %local_version, %remote, "Update available"),
                None => tracing::warn!("Could not determine remote version, updating anyway"),
            }
        }

        self.git.reset_hard(&clone, RELEASE_REF).await.map_err(|e| {
            tracing::warn!(error = %e, "git reset failed");
            PluginUpdateError::FetchFailed
        })?;

        let mkt_manifest = clone.join(MANIFEST_DIR).join("marketplace.json");
        if !mkt_manifest.exists() {
            return Err(PluginUpdateError::MarketplaceManifestMissing);
        }
        let source_rel = read_json::<MarketplaceManifest>(&mkt_manifest)?
            .source_of(PLUGIN_NAME)
            .ok_or(PluginUpdateError::NotInMarketplace)?;
        let source = clone.join(source_rel);

        let new_manifest = source.join(MANIFEST_DIR).join("plugin.json");
        if !new_manifest.exists() {
            return Err(PluginUpdateError::SourceManifestMissing);
        }
        let new_version = read_json::<PluginManifest>(&new_manifest)?.version;

        let commit_sha = self.git.head_sha(&clone).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read marketplace HEAD");
            String::new()
        });

        let cache_base = self.plugins_dir.join("cache").join(&mkt_name).join(PLUGIN_NAME);
        remove_tree(&cache_base)?;
        let new_cache = cache_base.join(&new_version);
        let files = copy_tree(&source, &new_cache)?;
        tracing::debug!(files, path = %new_cache.display(), "Copied plugin into cache");

        let now = chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let updated = InstallEntry {
            scope: install_entry.scope,
            install_path: new_cache.display().to_string(),
            version: new_version.clone(),
            installed_at: Some(install_entry.installed_at.unwrap_or_else(|| now.clone())),
            last_updated: Some(now),
            git_commit_sha: commit_sha,
            project_path: install_entry.project_path,
        };
        registry
            .replace_install(&install_key, &updated)
            .map_err(|source| PluginUpdateError::Json {
                path: registry_path.clone(),
                source,
            })?;
        write_json(&registry_path, &registry)?;

        Ok(UpdateOutcome::Updated {
            old_version: local_version,
            new_version,
            restart_required: true,
        })
    }

    fn find_clone(&self, mkt_name: &str) -> Result<PathBuf, PluginUpdateError> {
        let known_path = self.plugins_dir.join("known_marketplaces.json");
        let location = if known_path.exists() {
            read_json::<KnownMarketplaces>(&known_path)?
                .remove(mkt_name)
                .map(|m| m.install_location)
                .unwrap_or_default()
        } else {
            String::new()
        };

        let clone = PathBuf::from(&location);
        if location.is_empty() || !clone.exists() {
            return Err(PluginUpdateError::CloneMissing(mkt_name.to_string()));
        }
        Ok(clone)
    }

    /// Version published on the release branch, read without touching the
    /// work tree. `None` when anything along the way is unavailable.
    async fn remote_version(&self, clone: &Path) -> Option<String> {
        let mkt_rel = format!("{MANIFEST_DIR}/marketplace.json");
        let raw = self.git.show_file(clone, RELEASE_REF, &mkt_rel).await.ok()?;
        let source = parse_json::<MarketplaceManifest>(Path::new(&mkt_rel), &raw)
            .ok()?
            .source_of(PLUGIN_NAME)?;

        let plugin_rel = match source.trim_end_matches('/') {
            "" => format!("{MANIFEST_DIR}/plugin.json"),
            dir => format!("{dir}/{MANIFEST_DIR}/plugin.json"),
        };
        let raw = self.git.show_file(clone, RELEASE_REF, &plugin_rel).await.ok()?;
        let manifest = parse_json::<PluginManifest>(Path::new(&plugin_rel), &raw).ok()?;
        Some(manifest.version)
    }
}
