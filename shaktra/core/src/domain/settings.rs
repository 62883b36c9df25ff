// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Project Settings - memory retrieval namespace of `.shaktra/settings.yml`
//
// The settings file belongs to the whole workflow tool; only the `memory:`
// section is interpreted here. Every retrieval key is resolved on its own so
// that a single bad value never discards the rest of the configuration.

use serde_yaml::{Mapping, Value};
use std::path::Path;
use thiserror::Error;

use crate::domain::retrieval::RetrievalConfig;

/// Namespace holding the retrieval keys
pub const MEMORY_NAMESPACE: &str = "memory";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file {path} is not valid YAML: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One retrieval key that was present but unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingIssue {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Retrieval keys: canonical name, accepted alias, env override.
#[derive(Debug, Clone, Copy)]
struct RetrievalKey {
    name: &'static str,
    alias: &'static str,
    env: &'static str,
    min: u64,
}

const TIER1_MAX: RetrievalKey = RetrievalKey {
    name: "retrieval_tier1_max",
    alias: "tier1_max",
    env: "SHAKTRA_RETRIEVAL_TIER1_MAX",
    min: 0,
};

const TIER2_MAX: RetrievalKey = RetrievalKey {
    name: "retrieval_tier2_max",
    alias: "tier2_max",
    env: "SHAKTRA_RETRIEVAL_TIER2_MAX",
    min: 0,
};

const CHUNK_SIZE: RetrievalKey = RetrievalKey {
    name: "retrieval_chunk_size",
    alias: "chunk_size",
    env: "SHAKTRA_RETRIEVAL_CHUNK_SIZE",
    min: 1,
};

/// Parsed view over the memory namespace of a settings file.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    section: Mapping,
}

impl MemorySettings {
    /// Parse settings YAML. An empty document or a document without a
    /// `memory` mapping yields empty settings.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let document: Option<Value> = serde_yaml::from_str(yaml)?;
        let section = document
            .as_ref()
            .and_then(|doc| doc.get(MEMORY_NAMESPACE))
            .and_then(Value::as_mapping)
            .cloned()
            .unwrap_or_default();
        Ok(Self { section })
    }

    /// Load settings from disk. A missing file is not an error: callers get
    /// empty settings and therefore the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn raw(&self, key: RetrievalKey) -> Option<&Value> {
        self.section.get(key.name).or_else(|| self.section.get(key.alias))
    }

    fn resolve(&self, key: RetrievalKey, default: u64) -> u64 {
        match self.raw(key) {
            None => default,
            Some(value) => match accept(value, key.min) {
                Ok(n) => n,
                Err(reason) => {
                    tracing::warn!(
                        key = key.name,
                        value = %render(value),
                        reason,
                        default,
                        "Malformed retrieval setting, falling back to default"
                    );
                    default
                }
            },
        }
    }

    /// Effective retrieval configuration, defaults substituted per key.
    pub fn retrieval_config(&self) -> RetrievalConfig {
        let defaults = RetrievalConfig::default();
        RetrievalConfig {
            tier1_max: self.resolve(TIER1_MAX, defaults.tier1_max),
            tier2_max: self.resolve(TIER2_MAX, defaults.tier2_max),
            chunk_size: self.resolve(CHUNK_SIZE, defaults.chunk_size as u64) as usize,
        }
    }

    /// Keys that are present but would be replaced by their default.
    pub fn issues(&self) -> Vec<SettingIssue> {
        [TIER1_MAX, TIER2_MAX, CHUNK_SIZE]
            .into_iter()
            .filter_map(|key| {
                let value = self.raw(key)?;
                accept(value, key.min).err().map(|reason| SettingIssue {
                    key: key.name,
                    value: render(value),
                    reason,
                })
            })
            .collect()
    }
}

/// Apply `SHAKTRA_RETRIEVAL_*` environment overrides on top of file settings.
pub fn apply_env_overrides(config: &mut RetrievalConfig) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

fn apply_overrides_from(config: &mut RetrievalConfig, lookup: impl Fn(&str) -> Option<String>) {
    let parse = |key: RetrievalKey| -> Option<u64> {
        let raw = lookup(key.env)?;
        match raw.trim().parse::<u64>() {
            Ok(n) if n >= key.min => {
                tracing::info!("Environment override: {}={}", key.env, n);
                Some(n)
            }
            _ => {
                tracing::warn!("Invalid value for {}: '{}'. Ignoring.", key.env, raw);
                None
            }
        }
    };

    if let Some(n) = parse(TIER1_MAX) {
        config.tier1_max = n;
    }
    if let Some(n) = parse(TIER2_MAX) {
        config.tier2_max = n;
    }
    if let Some(n) = parse(CHUNK_SIZE) {
        config.chunk_size = n as usize;
    }
}

fn accept(value: &Value, min: u64) -> Result<u64, &'static str> {
    match value.as_u64() {
        Some(n) if n >= min => Ok(n),
        Some(_) => Err("below minimum"),
        None if value.as_i64().is_some() => Err("negative"),
        None => Err("not an integer"),
    }
}

fn render(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{:?}", value))
}
