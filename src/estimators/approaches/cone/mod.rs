// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

// Exponential-cone approach: index bookkeeping, program builders, the solver
// seam and post-solve diagnostics.

pub mod diagnostics;
pub mod distribution;
pub mod index;
pub mod pair;
pub mod program;
pub mod quad;
pub mod solver;
pub mod sparse;

pub use diagnostics::Diagnostics;
pub use distribution::{JointDistribution, Marginal, PairKey, Quad, WEIGHT_EPSILON};
pub use index::{Alphabets, QuadIndex, SourcePair, Support, Triple, TripleIndex};
pub use pair::PairModel;
pub use program::{ConeDims, ConicProgram};
pub use quad::QuadModel;
pub use solver::{ClarabelSolver, ConeSolver, SolveOutcome, Solution, SolverConfig, SolverInfo};
pub use sparse::{SparseMatrix, TripletBuilder};

use crate::estimators::traits::{ConeModel, Sources};

/// Pick the model for `sources` over a shared support.
pub fn model_for<'a>(sources: Sources, support: &'a Support) -> Box<dyn ConeModel + 'a> {
    match sources {
        Sources::All => Box::new(QuadModel::new(support)),
        Sources::Pair(pair) => Box::new(PairModel::new(pair, support)),
    }
}
