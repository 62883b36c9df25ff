// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Memory Stores
//!
//! Domain model for the three persistent memory stores of a Shaktra project
//! (`principles.yml`, `anti-patterns.yml`, `procedures.yml`).
//!
//! Entries are schema-free YAML mappings: only `id` and `status` carry
//! meaning here, every other field (text, guidance, provenance) is preserved
//! verbatim so it can be handed on unchanged.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Store ordering and active-entry iteration

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;

use crate::domain::retrieval::RetrievalError;

/// Status value that marks an entry as live.
pub const ACTIVE_STATUS: &str = "active";

/// The three memory stores, in the fixed order they are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    Principles,
    AntiPatterns,
    Procedures,
}

impl StoreKind {
    /// Aggregation order: principles, then anti-patterns, then procedures.
    pub const ALL: [StoreKind; 3] = [
        StoreKind::Principles,
        StoreKind::AntiPatterns,
        StoreKind::Procedures,
    ];

    /// File name of the store inside the memory directory
    pub fn file_name(self) -> &'static str {
        match self {
            StoreKind::Principles => "principles.yml",
            StoreKind::AntiPatterns => "anti-patterns.yml",
            StoreKind::Procedures => "procedures.yml",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A single memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryEntry {
    fields: Mapping,
}

impl MemoryEntry {
    pub fn new(fields: Mapping) -> Self {
        Self { fields }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// Explicit string status, if any.
    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    /// Entries without a `status` key are active. A present status must be
    /// exactly `active`; null or non-string values are not.
    pub fn is_active(&self) -> bool {
        match self.fields.get("status") {
            None => true,
            Some(_) => self.status() == Some(ACTIVE_STATUS),
        }
    }

    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    /// Copy of the entry tagged with the store file it came from.
    pub fn with_source(&self, store: StoreKind) -> Mapping {
        let mut fields = self.fields.clone();
        fields.insert(
            Value::String("_source_file".to_string()),
            Value::String(store.file_name().to_string()),
        );
        fields
    }
}

/// Ordered contents of one store. A missing store is simply empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore {
    pub kind: StoreKind,
    pub entries: Vec<MemoryEntry>,
}

impl MemoryStore {
    pub fn empty(kind: StoreKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn new(kind: StoreKind, entries: Vec<MemoryEntry>) -> Self {
        Self { kind, entries }
    }
}

/// All three stores of a memory directory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStores {
    principles: MemoryStore,
    anti_patterns: MemoryStore,
    procedures: MemoryStore,
}

impl Default for MemoryStores {
    fn default() -> Self {
        Self {
            principles: MemoryStore::empty(StoreKind::Principles),
            anti_patterns: MemoryStore::empty(StoreKind::AntiPatterns),
            procedures: MemoryStore::empty(StoreKind::Procedures),
        }
    }
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entries of one store.
    pub fn set(&mut self, kind: StoreKind, entries: Vec<MemoryEntry>) {
        *self.store_mut(kind) = MemoryStore::new(kind, entries);
    }

    pub fn with(mut self, kind: StoreKind, entries: Vec<MemoryEntry>) -> Self {
        self.set(kind, entries);
        self
    }

    pub fn store(&self, kind: StoreKind) -> &MemoryStore {
        match kind {
            StoreKind::Principles => &self.principles,
            StoreKind::AntiPatterns => &self.anti_patterns,
            StoreKind::Procedures => &self.procedures,
        }
    }

    fn store_mut(&mut self, kind: StoreKind) -> &mut MemoryStore {
        match kind {
            StoreKind::Principles => &mut self.principles,
            StoreKind::AntiPatterns => &mut self.anti_patterns,
            StoreKind::Procedures => &mut self.procedures,
        }
    }

    /// Lazily yields active entries across stores in aggregation order,
    /// preserving each store's insertion order.
    pub fn active_entries(&self) -> impl Iterator<Item = (StoreKind, &MemoryEntry)> + '_ {
        StoreKind::ALL.into_iter().flat_map(move |kind| {
            self.store(kind)
                .entries
                .iter()
                .filter(|entry| entry.is_active())
                .map(move |entry| (kind, entry))
        })
    }

    pub fn active_count(&self) -> usize {
        self.active_entries().count()
    }
}

/// Source of the three memory stores.
///
/// Implementations treat a missing store as empty; only unreadable or
/// unparsable stores are errors.
pub trait MemoryRepository {
    fn load_stores(&self) -> Result<MemoryStores, RetrievalError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn entry(id: &str, status: Option<&str>) -> MemoryEntry {
        let mut fields = Mapping::new();
        fields.insert(Value::from("id"), Value::from(id));
        fields.insert(Value::from("text"), Value::from(format!("text for {id}")));
        if let Some(status) = status {
            fields.insert(Value::from("status"), Value::from(status));
        }
        MemoryEntry::new(fields)
    }

    pub fn active(prefix: &str, count: usize) -> Vec<MemoryEntry> {
        (1..=count)
            .map(|i| entry(&format!("{prefix}-{i:03}"), None))
            .collect()
    }
}
