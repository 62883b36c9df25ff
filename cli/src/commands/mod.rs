// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for Shaktra CLI

pub mod config;
pub mod memory;
pub mod update;
pub mod validate;

pub use self::config::ConfigCommand;
pub use self::memory::MemoryCommand;
pub use self::update::UpdateCommand;
pub use self::validate::ValidateCommand;
