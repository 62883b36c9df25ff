// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain model: memory stores, retrieval tiers, settings, principles,
//! plugin registry records and validation reports.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types and rules shared by the use cases

pub mod memory;
pub mod retrieval;
pub mod settings;
pub mod principle;
pub mod plugin;
pub mod validation;
