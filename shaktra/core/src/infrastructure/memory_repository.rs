// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! YAML Memory Repository
//!
//! Reads the memory stores of a `.shaktra/memory` directory.
//!
//! # Store Format
//!
//! ```yaml
//! principles:
//!   - id: PR-001
//!     text: "Validate email format at the API boundary"
//!     status: active
//!   - id: PR-002
//!     text: "Raise domain exceptions, never raw DB errors"
//!     status: deprecated
//! ```
//!
//! Each file uses its own top-level key (`principles`, `anti_patterns`,
//! `procedures`); every top-level list is read, in document order.

use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::domain::memory::{MemoryEntry, MemoryRepository, MemoryStores, StoreKind};
use crate::domain::retrieval::RetrievalError;

pub struct YamlMemoryRepository {
    memory_dir: PathBuf,
}

impl YamlMemoryRepository {
    pub fn new(memory_dir: impl Into<PathBuf>) -> Self {
        Self {
            memory_dir: memory_dir.into(),
        }
    }

    /// Repository for the memory directory that serves a story directory
    /// (`.shaktra/stories/<id>` → `.shaktra/memory`).
    pub fn for_story_dir(story_dir: &Path) -> Result<Self, RetrievalError> {
        let shaktra_dir = story_dir
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| RetrievalError::InvalidStoryDir(story_dir.to_path_buf()))?;
        Ok(Self::new(shaktra_dir.join("memory")))
    }

    pub fn memory_dir(&self) -> &Path {
        &self.memory_dir
    }

    /// Entries of one store, in document order. A missing file is empty.
    pub fn load_store(&self, kind: StoreKind) -> Result<Vec<MemoryEntry>, RetrievalError> {
        let path = self.memory_dir.join(kind.file_name());
        if !path.exists() {
            tracing::debug!(store = %kind, "Memory store not present, treating as empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| RetrievalError::StoreRead {
            path: path.clone(),
            source,
        })?;
        let document: Option<Value> =
            serde_yaml::from_str(&content).map_err(|source| RetrievalError::StoreParse {
                path: path.clone(),
                source,
            })?;

        Ok(entries_from_document(kind, document))
    }
}

impl MemoryRepository for YamlMemoryRepository {
    fn load_stores(&self) -> Result<MemoryStores, RetrievalError> {
        let mut stores = MemoryStores::new();
        for kind in StoreKind::ALL {
            stores.set(kind, self.load_store(kind)?);
        }
        Ok(stores)
    }
}

fn entries_from_document(kind: StoreKind, document: Option<Value>) -> Vec<MemoryEntry> {
    let mapping = match document {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => {
            tracing::warn!(store = %kind, "Memory store is not a mapping, ignoring its contents");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for (key, value) in mapping {
        let Value::Sequence(items) = value else {
            continue;
        };
        for item in items {
            match item {
                Value::Mapping(fields) => entries.push(MemoryEntry::new(fields)),
                other => tracing::warn!(
                    store = %kind,
                    key = ?key,
                    item = ?other,
                    "Skipping memory entry that is not a mapping"
                ),
            }
        }
    }
    entries
}
