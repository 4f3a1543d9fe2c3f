// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::PidError;
use crate::estimators::approaches::cone::diagnostics::Diagnostics;
use crate::estimators::approaches::cone::distribution::JointDistribution;
use crate::estimators::approaches::cone::index::{SourcePair, Support};
use crate::estimators::approaches::cone::model_for;
use crate::estimators::approaches::cone::program::ConicProgram;
use crate::estimators::approaches::cone::solver::{
    ClarabelSolver, ConeSolver, SolveOutcome, Solution, SolverConfig,
};
use crate::estimators::traits::{ConeModel, Sources};

/// How much of the decomposition to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decomposition {
    /// Only the quad program: synergistic information.
    #[default]
    Synergy,
    /// Quad program plus the three pair programs: synergistic, unique and
    /// shared information.
    Full,
}

/// Configuration of one PID estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct PidConfig {
    /// Must equal the engine's name (`"Clarabel"` for the default engine).
    pub solver_name: String,
    /// 0 = silent, 1 = progress events, 2+ = solver log and solver info.
    pub verbosity: u32,
    pub decomposition: Decomposition,
    pub solver: SolverConfig,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            solver_name: ClarabelSolver::NAME.to_string(),
            verbosity: 0,
            decomposition: Decomposition::default(),
            solver: SolverConfig::default(),
        }
    }
}

impl PidConfig {
    pub fn with_solver_name(mut self, name: impl Into<String>) -> Self {
        self.solver_name = name.into();
        self
    }

    pub fn with_verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_decomposition(mut self, decomposition: Decomposition) -> Self {
        self.decomposition = decomposition;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }
}

/// Worst residuals over every solved program: (primal, dual, duality gap).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericalError {
    pub primal: f64,
    pub dual: f64,
    pub gap: f64,
}

impl NumericalError {
    fn absorb(&mut self, diagnostics: &Diagnostics) {
        self.primal = self.primal.max(diagnostics.primal_residual);
        self.dual = self.dual.max(diagnostics.dual_residual);
        self.gap = self.gap.max(diagnostics.duality_gap);
    }

    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.primal, self.dual, self.gap)
    }
}

/// Unique information of each source, in bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniqueInformation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Entropies behind the decomposition, in bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entropies {
    /// H(S) of the input.
    pub target: f64,
    /// H(S | X, Y, Z) of the input.
    pub given_sources: f64,
    /// Maximum of H(S | X, Y, Z) over distributions with the same marginals.
    pub max_given_sources: f64,
    /// Maxima of H(S | X, Y), H(S | X, Z) and H(S | Y, Z), when computed.
    pub max_given_pairs: Option<[f64; 3]>,
}

/// A program together with whatever the solver produced for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverObject {
    pub sources: Sources,
    pub program: ConicProgram,
    pub solution: Option<Solution>,
    pub status: String,
}

/// Decomposition of the information the sources carry about the target.
#[derive(Debug, Clone, PartialEq)]
pub struct PidReport {
    /// Synergistic information, in bits.
    pub synergy: f64,
    /// Unique information per source (full decomposition only).
    pub unique: Option<UniqueInformation>,
    /// Shared information (full decomposition only).
    pub shared: Option<f64>,
    pub num_err: NumericalError,
    /// Which engine produced the numbers.
    pub solver: String,
    pub entropies: Entropies,
    /// Programs and solutions, kept when `keep_solver_object` is set.
    pub solver_objects: Vec<SolverObject>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PidOutcome {
    Decomposed(PidReport),
    /// The solver failed and the caller asked for the program instead of an error.
    Unsolved(SolverObject),
}

impl PidOutcome {
    pub fn report(&self) -> Option<&PidReport> {
        match self {
            PidOutcome::Decomposed(report) => Some(report),
            PidOutcome::Unsolved(_) => None,
        }
    }

    pub fn into_report(self) -> Option<PidReport> {
        match self {
            PidOutcome::Decomposed(report) => Some(report),
            PidOutcome::Unsolved(_) => None,
        }
    }
}

struct SolvedModel {
    sources: Sources,
    program: ConicProgram,
    solution: Solution,
    diagnostics: Diagnostics,
}

enum Step {
    Solved(SolvedModel),
    Unsolved(SolverObject),
}

/// Trivariate PID estimator over a pluggable cone solver.
pub struct PidEstimator<S: ConeSolver = ClarabelSolver> {
    config: PidConfig,
    solver: S,
}

impl PidEstimator<ClarabelSolver> {
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            solver: ClarabelSolver,
        }
    }
}

impl<S: ConeSolver> PidEstimator<S> {
    pub fn with_solver(config: PidConfig, solver: S) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Check the configuration before any model is built.
    pub fn validate(&self) -> Result<(), PidError> {
        if self.config.solver_name != self.solver.name() {
            return Err(PidError::UnsupportedSolver(self.config.solver_name.clone()));
        }
        self.config.solver.validate()
    }

    /// Run the estimation on an already validated distribution.
    pub fn estimate(&self, pdf: &JointDistribution) -> Result<PidOutcome, PidError> {
        self.validate()?;
        let config = &self.config;
        let pdf = pdf.filtered();
        if pdf.is_empty() {
            return Err(PidError::EmptyDistribution);
        }

        let support = Support::new(&pdf);
        if config.verbosity > 0 {
            tracing::info!(
                quads = support.quads.len(),
                marginal_rows = support.n_marginal_rows(),
                decomposition = ?config.decomposition,
                "preparing cone program data"
            );
        }

        let solver_config = SolverConfig {
            verbose: config.solver.verbose || config.verbosity > 1,
            ..config.solver.clone()
        };

        let quad = model_for(Sources::All, &support);
        let quad_run = match self.run(quad.as_ref(), &solver_config)? {
            Step::Solved(run) => run,
            Step::Unsolved(object) => return Ok(PidOutcome::Unsolved(object)),
        };

        let given_sources = pdf.condentropy();
        let target = pdf.target_entropy();
        let max_given_sources = quad_run.diagnostics.condentropy;
        let synergy = max_given_sources - given_sources;

        let mut num_err = NumericalError::default();
        num_err.absorb(&quad_run.diagnostics);
        let mut runs = vec![quad_run];

        let mut unique = None;
        let mut shared = None;
        let mut max_given_pairs = None;
        if config.decomposition == Decomposition::Full {
            let mut h_pairs = [0.0_f64; 3];
            for (slot, pair) in SourcePair::ALL.into_iter().enumerate() {
                let model = model_for(Sources::Pair(pair), &support);
                let run = match self.run(model.as_ref(), &solver_config)? {
                    Step::Solved(run) => run,
                    Step::Unsolved(object) => return Ok(PidOutcome::Unsolved(object)),
                };
                h_pairs[slot] = run.diagnostics.condentropy;
                num_err.absorb(&run.diagnostics);
                runs.push(run);
            }

            let [h_xy, h_xz, h_yz] = h_pairs;
            let ui = UniqueInformation {
                x: h_yz - max_given_sources,
                y: h_xz - max_given_sources,
                z: h_xy - max_given_sources,
            };
            shared = Some(target - max_given_sources - ui.x - ui.y - ui.z);
            unique = Some(ui);
            max_given_pairs = Some(h_pairs);
        }

        if config.verbosity > 0 {
            tracing::info!(
                synergy,
                primal = num_err.primal,
                dual = num_err.dual,
                gap = num_err.gap,
                "pid done"
            );
        }

        let solver_objects = if config.solver.keep_solver_object {
            runs.into_iter()
                .map(|run| SolverObject {
                    sources: run.sources,
                    status: run.solution.info.status.clone(),
                    program: run.program,
                    solution: Some(run.solution),
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(PidOutcome::Decomposed(PidReport {
            synergy,
            unique,
            shared,
            num_err,
            solver: self.solver.provenance().to_string(),
            entropies: Entropies {
                target,
                given_sources,
                max_given_sources,
                max_given_pairs,
            },
            solver_objects,
        }))
    }

    fn run(&self, model: &dyn ConeModel, solver_config: &SolverConfig) -> Result<Step, PidError> {
        let sources = model.sources();
        let program = model.build();
        if self.config.verbosity > 0 {
            tracing::info!(
                ?sources,
                vars = program.n_vars(),
                equalities = program.n_equalities(),
                exp_cones = program.dims().e,
                "starting solver"
            );
        }

        match model.solve(&program, &self.solver, solver_config) {
            SolveOutcome::Solved(solution) => {
                let diagnostics = model.diagnose(&program, &solution);
                if self.config.verbosity > 1 {
                    tracing::debug!(?sources, info = ?solution.info, ?diagnostics, "solver info");
                }
                Ok(Step::Solved(SolvedModel {
                    sources,
                    program,
                    solution,
                    diagnostics,
                }))
            }
            SolveOutcome::Failed { status } => {
                if self.config.verbosity > 0 {
                    tracing::warn!(?sources, %status, "cone programming solver failed to find (near) optimal solution");
                }
                if solver_config.keep_solver_object {
                    Ok(Step::Unsolved(SolverObject {
                        sources,
                        program,
                        solution: None,
                        status,
                    }))
                } else {
                    Err(PidError::SolverFailed { status })
                }
            }
        }
    }
}

/// Estimate the PID of loosely typed rows `(s, x, y, z) -> weight`.
///
/// Rows, solver name and solver options are validated before any model is
/// built.
pub fn pid<I, K>(rows: I, config: &PidConfig) -> Result<PidOutcome, PidError>
where
    I: IntoIterator<Item = (K, f64)>,
    K: AsRef<[i32]>,
{
    let estimator = PidEstimator::new(config.clone());
    estimator.validate()?;
    let pdf = JointDistribution::from_rows(rows)?;
    estimator.estimate(&pdf)
}

/// Estimate the PID of a typed distribution with the default engine.
pub fn pid_distribution(pdf: &JointDistribution, config: &PidConfig) -> Result<PidOutcome, PidError> {
    PidEstimator::new(config.clone()).estimate(pdf)
}
