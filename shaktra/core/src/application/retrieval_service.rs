// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Memory Retrieval Use Case
//!
//! Counts active memory entries, picks a retrieval tier and, for tier 3,
//! writes the chunk set an agent will page through.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrates repository → tier selection → chunk writer

use std::path::{Path, PathBuf};

use crate::domain::memory::MemoryRepository;
use crate::domain::retrieval::{partition, RetrievalConfig, RetrievalDecision, RetrievalError, Tier};
use crate::domain::settings::{apply_env_overrides, MemorySettings, SettingsError};
use crate::infrastructure::chunk_writer::ChunkWriter;
use crate::infrastructure::memory_repository::YamlMemoryRepository;

pub struct MemoryRetrievalService<R: MemoryRepository> {
    repository: R,
    writer: ChunkWriter,
    config: RetrievalConfig,
}

impl<R: MemoryRepository> MemoryRetrievalService<R> {
    pub fn new(repository: R, story_dir: impl Into<PathBuf>, config: RetrievalConfig) -> Self {
        Self {
            repository,
            writer: ChunkWriter::new(story_dir),
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Select the tier; in tier 3 also write chunks and the manifest.
    pub fn retrieve(&self) -> Result<RetrievalDecision, RetrievalError> {
        let stores = self.repository.load_stores()?;
        let total = stores.active_count();
        let tier = self.config.select_tier(total);

        tracing::info!(
            total,
            tier = tier.number(),
            tier1_max = self.config.tier1_max,
            tier2_max = self.config.tier2_max,
            "Selected memory retrieval tier"
        );

        if tier != Tier::Chunked {
            return Ok(RetrievalDecision::unchunked(tier, total));
        }

        let chunks = partition(&stores, self.config.chunk_size);
        let manifest = self.writer.write(&chunks)?;

        Ok(RetrievalDecision {
            tier,
            total_entries: total,
            chunks: manifest.chunks,
        })
    }
}

impl MemoryRetrievalService<YamlMemoryRepository> {
    /// Service for `<story_dir>` reading `<story_dir>/../../memory` with
    /// retrieval settings from `settings_path` plus environment overrides.
    pub fn for_story(story_dir: &Path, settings_path: &Path) -> Result<Self, RetrievalSetupError> {
        let mut config = MemorySettings::load(settings_path)?.retrieval_config();
        apply_env_overrides(&mut config);

        let repository = YamlMemoryRepository::for_story_dir(story_dir)?;
        tracing::debug!(
            memory_dir = %repository.memory_dir().display(),
            "Resolved memory directory"
        );

        Ok(Self::new(repository, story_dir, config))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalSetupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}
