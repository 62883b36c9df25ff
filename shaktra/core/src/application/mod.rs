// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod retrieval_service;
pub mod migration_service;
pub mod plugin_updater;
pub mod validators;

// Re-export use cases for convenience
pub use migration_service::MemoryMigrationService;
pub use plugin_updater::PluginUpdater;
pub use retrieval_service::{MemoryRetrievalService, RetrievalSetupError};
