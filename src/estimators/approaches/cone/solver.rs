// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use ndarray::Array1;

use crate::error::PidError;
use crate::estimators::approaches::cone::program::{ConeDims, ConicProgram};
use crate::estimators::approaches::cone::sparse::TripletBuilder;

/// Options handed to the cone solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Iteration cap; the only way to bound the running time of a solve.
    pub max_iter: u32,
    /// Primal/dual feasibility tolerance.
    pub tol_feas: f64,
    /// Absolute duality gap tolerance.
    pub tol_gap_abs: f64,
    /// Relative duality gap tolerance.
    pub tol_gap_rel: f64,
    /// Let the solver print its own iteration log.
    pub verbose: bool,
    /// Hand the program back instead of raising when the solver fails.
    pub keep_solver_object: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol_feas: 1e-8,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            verbose: false,
            keep_solver_object: false,
        }
    }
}

impl SolverConfig {
    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerances(mut self, tol_feas: f64, tol_gap_abs: f64, tol_gap_rel: f64) -> Self {
        self.tol_feas = tol_feas;
        self.tol_gap_abs = tol_gap_abs;
        self.tol_gap_rel = tol_gap_rel;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_keep_solver_object(mut self, keep: bool) -> Self {
        self.keep_solver_object = keep;
        self
    }

    pub fn validate(&self) -> Result<(), PidError> {
        if self.max_iter == 0 {
            return Err(PidError::InvalidSolverConfig(
                "max_iter must be at least 1".to_string(),
            ));
        }
        for (name, tol) in [
            ("tol_feas", self.tol_feas),
            ("tol_gap_abs", self.tol_gap_abs),
            ("tol_gap_rel", self.tol_gap_rel),
        ] {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(PidError::InvalidSolverConfig(format!(
                    "{name} must be finite and positive, got {tol}"
                )));
            }
        }
        Ok(())
    }
}

/// What the solver reported about a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverInfo {
    pub status: String,
    pub iterations: u32,
    pub primal_objective: f64,
    pub solve_time: f64,
}

/// Raw solution in the canonical layout of [`ConicProgram`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Primal variables.
    pub x: Array1<f64>,
    /// Slacks `h - G x`.
    pub s: Array1<f64>,
    /// Duals of `A x = b`.
    pub y: Array1<f64>,
    /// Duals of the cone constraints.
    pub z: Array1<f64>,
    pub info: SolverInfo,
}

/// Result of a single solver invocation. Failure is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Solved(Solution),
    Failed { status: String },
}

/// An engine that solves canonical exponential-cone programs.
pub trait ConeSolver {
    /// Name accepted in [`crate::PidConfig::solver_name`].
    fn name(&self) -> &'static str;

    /// Provenance string reported with every result.
    fn provenance(&self) -> &'static str;

    /// Run the engine once on `program`. Never retries.
    fn solve(&self, program: &ConicProgram, config: &SolverConfig) -> SolveOutcome;
}

/// Pure-Rust interior-point engine.
///
/// Clarabel solves `min qᵀx s.t. Ax + s = b, s ∈ K` and orders exponential
/// cone components as `(x, y, z)` with `y·exp(x/y) <= z`. The canonical
/// program is stacked as `[A; G]` over a zero cone and the canonical cones,
/// with the last two components of each exponential block swapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarabelSolver;

impl ClarabelSolver {
    pub const NAME: &'static str = "Clarabel";
}

/// Position of canonical cone row `row` inside Clarabel's cone rows.
///
/// Swapping `p` and `q` is an involution, so the same map takes Clarabel rows
/// back to canonical ones.
pub fn clarabel_cone_row(row: usize, dims: ConeDims) -> usize {
    if row < dims.l {
        return row;
    }
    let k = row - dims.l;
    let base = dims.l + 3 * (k / 3);
    match k % 3 {
        0 => base,
        1 => base + 2,
        _ => base + 1,
    }
}

impl ConeSolver for ClarabelSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn provenance(&self) -> &'static str {
        "Clarabel https://clarabel.org"
    }

    fn solve(&self, program: &ConicProgram, config: &SolverConfig) -> SolveOutcome {
        let n = program.n_vars();
        let p = program.n_equalities();
        let dims = program.dims();
        let m = p + dims.n_rows();

        let mut stacked = TripletBuilder::with_capacity(m, n, program.a().nnz() + program.g().nnz());
        for (row, col, value) in program.a().iter() {
            stacked.push(row, col, value);
        }
        for (row, col, value) in program.g().iter() {
            stacked.push(p + clarabel_cone_row(row, dims), col, value);
        }
        let stacked = stacked.finish();

        let mut rhs = vec![0.0; m];
        for (row, &value) in program.b().iter().enumerate() {
            rhs[row] = value;
        }
        for (row, &value) in program.h().iter().enumerate() {
            rhs[p + clarabel_cone_row(row, dims)] = value;
        }

        let a_mat = CscMatrix::new(
            m,
            n,
            stacked.col_ptr().to_vec(),
            stacked.row_idx().to_vec(),
            stacked.values().to_vec(),
        );
        let p_mat = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());
        let q = program.c().to_vec();

        let mut cones: Vec<SupportedConeT<f64>> = Vec::with_capacity(2 + dims.e);
        if p > 0 {
            cones.push(SupportedConeT::ZeroConeT(p));
        }
        if dims.l > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(dims.l));
        }
        cones.extend((0..dims.e).map(|_| SupportedConeT::ExponentialConeT()));

        let settings = match DefaultSettingsBuilder::<f64>::default()
            .max_iter(config.max_iter)
            .verbose(config.verbose)
            .tol_feas(config.tol_feas)
            .tol_gap_abs(config.tol_gap_abs)
            .tol_gap_rel(config.tol_gap_rel)
            .build()
        {
            Ok(settings) => settings,
            Err(e) => {
                return SolveOutcome::Failed {
                    status: format!("invalid solver settings: {e:?}"),
                };
            }
        };

        let mut solver = DefaultSolver::new(&p_mat, &q, &a_mat, &rhs, &cones, settings);
        solver.solve();
        let raw = &solver.solution;

        match &raw.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {}
            status => {
                tracing::debug!(?status, iterations = raw.iterations, "clarabel_failed");
                return SolveOutcome::Failed {
                    status: format!("{status:?}"),
                };
            }
        }

        let y = Array1::from_iter(raw.z[..p].iter().copied());
        let z = Array1::from_shape_fn(dims.n_rows(), |row| raw.z[p + clarabel_cone_row(row, dims)]);
        let s = Array1::from_shape_fn(dims.n_rows(), |row| raw.s[p + clarabel_cone_row(row, dims)]);

        SolveOutcome::Solved(Solution {
            x: Array1::from(raw.x.clone()),
            s,
            y,
            z,
            info: SolverInfo {
                status: format!("{:?}", raw.status),
                iterations: raw.iterations,
                primal_objective: raw.obj_val,
                solve_time: raw.solve_time,
            },
        })
    }
}
