// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Chunk Writer
//!
//! Persists tier-3 chunks and their manifest under `<story_dir>/.chunks/`:
//!
//! ```text
//! .chunks/
//! ├── manifest.yml     # chunk_count + per-chunk path/entry_count
//! ├── chunk-001.yml    # {entries: [...]}
//! └── chunk-002.yml
//! ```
//!
//! The set is written into a staging directory next to `.chunks` and then
//! swapped in, so a chunk set never mixes files from two runs. Readers that
//! open `.chunks` while the swap happens may still see the directory
//! missing for an instant; retrieval is not meant to run concurrently with
//! readers of the same story.

use serde::Serialize;
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

use crate::domain::retrieval::{
    Chunk, ChunkManifest, RetrievalError, CHUNK_DIR_NAME, MANIFEST_FILE_NAME,
};

#[derive(Serialize)]
struct ChunkDocument {
    entries: Vec<Mapping>,
}

pub struct ChunkWriter {
    story_dir: PathBuf,
}

impl ChunkWriter {
    pub fn new(story_dir: impl Into<PathBuf>) -> Self {
        Self {
            story_dir: story_dir.into(),
        }
    }

    pub fn chunk_dir(&self) -> PathBuf {
        self.story_dir.join(CHUNK_DIR_NAME)
    }

    /// Replace the chunk directory with `chunks` and a fresh manifest.
    pub fn write(&self, chunks: &[Chunk<'_>]) -> Result<ChunkManifest, RetrievalError> {
        let target = self.chunk_dir();
        let staging = self
            .story_dir
            .join(format!("{CHUNK_DIR_NAME}.staging-{}", uuid::Uuid::new_v4()));

        let result = self.write_set(&staging, chunks).and_then(|manifest| {
            swap_into_place(&staging, &target)?;
            Ok(manifest)
        });

        if result.is_err() && staging.exists() {
            if let Err(e) = std::fs::remove_dir_all(&staging) {
                tracing::warn!(
                    path = %staging.display(),
                    error = %e,
                    "Failed to clean up chunk staging directory"
                );
            }
        }

        let manifest = result?;
        tracing::info!(
            chunk_count = manifest.chunk_count,
            path = %target.display(),
            "Wrote memory chunks"
        );
        Ok(manifest)
    }

    fn write_set(&self, dir: &Path, chunks: &[Chunk<'_>]) -> Result<ChunkManifest, RetrievalError> {
        std::fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;

        let mut refs = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let document = ChunkDocument {
                entries: chunk
                    .entries
                    .iter()
                    .map(|(store, entry)| entry.with_source(*store))
                    .collect(),
            };
            let path = dir.join(chunk.file_name());
            write_yaml(&path, &document)?;
            tracing::debug!(
                sequence = chunk.sequence,
                entries = chunk.entry_count(),
                "Wrote chunk"
            );
            refs.push(chunk.to_ref());
        }

        let manifest = ChunkManifest::from_refs(refs);
        write_yaml(&dir.join(MANIFEST_FILE_NAME), &manifest)?;
        Ok(manifest)
    }
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), RetrievalError> {
    let yaml = serde_yaml::to_string(value)?;
    std::fs::write(path, yaml).map_err(|source| io_error(path, source))
}

/// Move `staging` to `target`, retiring whatever was at `target` first.
fn swap_into_place(staging: &Path, target: &Path) -> Result<(), RetrievalError> {
    let retired = if target.exists() {
        let retired = target.with_file_name(format!(
            "{CHUNK_DIR_NAME}.retired-{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::rename(target, &retired).map_err(|source| io_error(target, source))?;
        Some(retired)
    } else {
        None
    };

    std::fs::rename(staging, target).map_err(|source| io_error(target, source))?;

    if let Some(retired) = retired {
        if let Err(e) = std::fs::remove_dir_all(&retired) {
            tracing::warn!(
                path = %retired.display(),
                error = %e,
                "Failed to remove previous chunk set"
            );
        }
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> RetrievalError {
    RetrievalError::ChunkWrite {
        path: path.to_path_buf(),
        source,
    }
}
