// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Retrieval Tiering
//!
//! Decides how much of project memory an agent may load at once.
//!
//! | Tier | Condition | Behaviour |
//! |------|-----------|-----------|
//! | 1 | `total <= tier1_max` | everything returned directly |
//! | 2 | `total <= tier2_max` | everything returned, flagged as large |
//! | 3 | otherwise | nothing returned directly; entries are chunked |
//!
//! Thresholds are inclusive upper bounds, so a total equal to a threshold
//! selects the lower tier.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Tier selection, chunk partitioning, manifest model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::memory::{MemoryEntry, MemoryStores, StoreKind};

pub const DEFAULT_TIER1_MAX: u64 = 100;
pub const DEFAULT_TIER2_MAX: u64 = 500;
pub const DEFAULT_CHUNK_SIZE: usize = 150;

/// Directory (relative to the story directory) holding tier-3 chunks
pub const CHUNK_DIR_NAME: &str = ".chunks";
pub const MANIFEST_FILE_NAME: &str = "manifest.yml";

/// Retrieval thresholds. Built fresh for every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub tier1_max: u64,
    pub tier2_max: u64,
    pub chunk_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            tier1_max: DEFAULT_TIER1_MAX,
            tier2_max: DEFAULT_TIER2_MAX,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl RetrievalConfig {
    pub fn select_tier(&self, total: usize) -> Tier {
        let total = total as u64;
        if total <= self.tier1_max {
            Tier::Direct
        } else if total <= self.tier2_max {
            Tier::Large
        } else {
            Tier::Chunked
        }
    }
}

/// Retrieval strategy level. Serialized as its number (1, 2, 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    Direct,
    Large,
    Chunked,
}

impl Tier {
    pub fn number(self) -> u8 {
        match self {
            Tier::Direct => 1,
            Tier::Large => 2,
            Tier::Chunked => 3,
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::Direct),
            2 => Ok(Tier::Large),
            3 => Ok(Tier::Chunked),
            other => Err(format!("unknown retrieval tier {other}")),
        }
    }
}

/// File name of a chunk, e.g. `chunk-001.yml`.
pub fn chunk_file_name(sequence: usize) -> String {
    format!("chunk-{sequence:03}.yml")
}

/// Reference to a persisted chunk, as reported to callers and in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRef {
    pub path: String,
    pub entry_count: usize,
}

/// A contiguous slice of the active-entry sequence.
#[derive(Debug, Clone)]
pub struct Chunk<'a> {
    /// 1-based position in partition order
    pub sequence: usize,
    pub entries: Vec<(StoreKind, &'a MemoryEntry)>,
}

impl Chunk<'_> {
    pub fn file_name(&self) -> String {
        chunk_file_name(self.sequence)
    }

    pub fn relative_path(&self) -> String {
        format!("{}/{}", CHUNK_DIR_NAME, self.file_name())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn to_ref(&self) -> ChunkRef {
        ChunkRef {
            path: self.relative_path(),
            entry_count: self.entry_count(),
        }
    }
}

/// Partitions the active entries of `stores` into consecutive chunks of
/// `chunk_size`; the final chunk may be shorter. A zero chunk size is
/// treated as one.
pub fn partition(stores: &MemoryStores, chunk_size: usize) -> Vec<Chunk<'_>> {
    let chunk_size = chunk_size.max(1);
    let mut chunks: Vec<Chunk<'_>> = Vec::new();

    for item in stores.active_entries() {
        match chunks.last_mut() {
            Some(chunk) if chunk.entries.len() < chunk_size => chunk.entries.push(item),
            _ => {
                let sequence = chunks.len() + 1;
                let mut entries = Vec::with_capacity(chunk_size);
                entries.push(item);
                chunks.push(Chunk { sequence, entries });
            }
        }
    }

    chunks
}

/// Index of all chunks produced by one retrieval pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkManifest {
    pub chunk_count: usize,
    pub chunks: Vec<ChunkRef>,
}

impl ChunkManifest {
    pub fn from_refs(chunks: Vec<ChunkRef>) -> Self {
        Self {
            chunk_count: chunks.len(),
            chunks,
        }
    }

    pub fn total_entries(&self) -> usize {
        self.chunks.iter().map(|c| c.entry_count).sum()
    }
}

/// Outcome of one retrieval request; printed as JSON on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalDecision {
    pub tier: Tier,
    pub total_entries: usize,
    pub chunks: Vec<ChunkRef>,
}

impl RetrievalDecision {
    pub fn unchunked(tier: Tier, total_entries: usize) -> Self {
        Self {
            tier,
            total_entries,
            chunks: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Story directory {0} has no grandparent; expected .shaktra/stories/<id>")]
    InvalidStoryDir(PathBuf),

    #[error("Failed to read memory store {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Memory store {path} is not valid YAML: {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write chunks under {path}: {source}")]
    ChunkWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize chunk data: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
