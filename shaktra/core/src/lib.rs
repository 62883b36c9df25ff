// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Shaktra core library
//!
//! Memory retrieval tiering, legacy memory migration, plugin updates and
//! workflow artifact validation for the Shaktra development workflow.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain rules, use cases and their filesystem/git adapters

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
