// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::estimators::approaches::cone::diagnostics::{dual_objective, duality_gap, Diagnostics};
use crate::estimators::approaches::cone::index::SourcePair;
use crate::estimators::approaches::cone::program::ConicProgram;
use crate::estimators::approaches::cone::solver::{ConeSolver, SolveOutcome, Solution, SolverConfig};

/// Which sources a cone model conditions the target on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sources {
    /// All three sources: H(S | X, Y, Z).
    All,
    /// A source pair: H(S | pair).
    Pair(SourcePair),
}

/// Primal and dual infeasibility of a solution (worst violations).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feasibility {
    pub primal: f64,
    pub dual: f64,
}

/// One maximum-entropy formulation of the PID optimisation.
///
/// A model owns its variable layout. It builds the canonical program, hands
/// it to a solver and reads the raw solution back into entropies and
/// residuals derived from its own KKT conditions.
pub trait ConeModel {
    fn sources(&self) -> Sources;

    /// Assemble the cone program. Deterministic for a given support.
    fn build(&self) -> ConicProgram;

    /// Run `solver` once on a program produced by [`ConeModel::build`].
    fn solve(
        &self,
        program: &ConicProgram,
        solver: &dyn ConeSolver,
        config: &SolverConfig,
    ) -> SolveOutcome {
        solver.solve(program, config)
    }

    /// Value of the q-variable of every quad, in quad-index order.
    fn q_values(&self, solution: &Solution) -> Vec<f64>;

    /// Conditional entropy of the target given this model's sources, in bits.
    fn condentropy(&self, solution: &Solution) -> f64;

    fn feasibility(&self, solution: &Solution) -> Feasibility;

    /// Entropy, dual objective, residuals and duality gap of a solution.
    fn diagnose(&self, program: &ConicProgram, solution: &Solution) -> Diagnostics {
        let condentropy = self.condentropy(solution);
        let feasibility = self.feasibility(solution);
        let dual = dual_objective(&solution.y, program.b());
        Diagnostics {
            condentropy,
            dual_objective: dual,
            primal_residual: feasibility.primal,
            dual_residual: feasibility.dual,
            duality_gap: duality_gap(condentropy, dual),
        }
    }
}
