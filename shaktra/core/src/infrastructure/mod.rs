// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod memory_repository;
pub mod chunk_writer;
pub mod git_cli;
pub mod plugin_files;

pub use chunk_writer::ChunkWriter;
pub use git_cli::GitCli;
pub use memory_repository::YamlMemoryRepository;
