// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # pidcone
//!
//! Trivariate partial information decomposition (PID) of a discrete joint
//! distribution of a target `S` and three sources `X`, `Y`, `Z`, computed by
//! exponential-cone programming.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pidcone::{pid, Decomposition, PidConfig, PidOutcome};
//!
//! // S = X AND Y, with an independent fair bit Z
//! let mut rows = Vec::new();
//! for x in 0..2 {
//!     for y in 0..2 {
//!         for z in 0..2 {
//!             rows.push(([x & y, x, y, z], 0.125));
//!         }
//!     }
//! }
//!
//! let config = PidConfig::default().with_decomposition(Decomposition::Full);
//! if let PidOutcome::Decomposed(report) = pid(rows, &config).unwrap() {
//!     println!("CI = {:.4} bits, SI = {:?}", report.synergy, report.shared);
//! }
//! ```
//!
//! ## How it works
//!
//! Among all distributions with the same (S,X), (S,Y) and (S,Z) marginals,
//! the one maximising H(S | X, Y, Z) is found by a convex program with one
//! exponential cone per support tuple. The gap between that maximum and the
//! conditional entropy of the input is the synergistic information. The full
//! decomposition solves three more programs, one per source pair, and reads
//! unique and shared information off the differences.
//!
//! Every reported number is in bits. Each solve is followed by a check of
//! primal feasibility, dual feasibility and the duality gap, taken from the
//! raw solver output; the worst values end up in
//! [`PidReport::num_err`](estimators::pid::PidReport::num_err).
//!
//! ## Architecture
//!
//! 1. **Public API Layer**: [`pid`], [`pid_distribution`] and [`PidEstimator`]
//! 2. **Cone Models**: [`QuadModel`](estimators::approaches::QuadModel) for
//!    all three sources and [`PairModel`](estimators::approaches::PairModel)
//!    for a source pair, behind the [`ConeModel`](estimators::traits::ConeModel) trait
//! 3. **Core Infrastructure**: the joint distribution, the support indices and
//!    sparse program assembly
//! 4. **Solver Layer**: the [`ConeSolver`](estimators::approaches::ConeSolver)
//!    seam, with a Clarabel backend

pub mod error;
pub mod estimators;

pub use error::PidError;
pub use estimators::pid::{
    pid, pid_distribution, Decomposition, Entropies, NumericalError, PidConfig, PidEstimator,
    PidOutcome, PidReport, SolverObject, UniqueInformation,
};
