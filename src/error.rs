// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Errors raised by the PID estimator.
///
/// Everything except [`PidError::SolverFailed`] is a validation error and is
/// reported before any cone program is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PidError {
    #[error("distribution keys must be (s, x, y, z) tuples of length 4, got length {len}")]
    InvalidKey { len: usize },
    #[error("distribution weight for {key:?} must be finite and non-negative, got {value}")]
    InvalidWeight { key: [i32; 4], value: f64 },
    #[error("distribution has no entry with positive weight")]
    EmptyDistribution,
    #[error("no interface for cone solver `{0}` (only `Clarabel`)")]
    UnsupportedSolver(String),
    #[error("invalid solver configuration: {0}")]
    InvalidSolverConfig(String),
    #[error("cone programming solver failed to find a (near) optimal solution: {status}")]
    SolverFailed { status: String },
}
