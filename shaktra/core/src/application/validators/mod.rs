// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Workflow Artifact Validators
//!
//! After an end-to-end workflow run, each validator inspects the `.shaktra/`
//! tree it left behind and returns a [`ValidationReport`]. Validators never
//! fail early on a missing artifact unless nothing further can be checked.
//!
//! [`ValidationReport`]: crate::domain::validation::ValidationReport

pub mod checks;

mod analyze;
mod dev;
mod incident;
mod init;
mod negative;
mod pm;
mod review;
mod tpm;

pub use analyze::{validate_analyze, DIMENSION_FILES};
pub use dev::{validate_dev, VALID_PHASES};
pub use incident::validate_incident;
pub use init::{validate_init, InitExpectations};
pub use negative::{
    validate_error_detected, validate_no_handoff, validate_no_progression, TEST_LOG,
};
pub use pm::validate_pm;
pub use review::{validate_review, VALID_SEVERITIES, VALID_VERDICTS};
pub use tpm::{validate_tpm, VALID_SCOPES, VALID_TIERS};
