pub mod cone;

// Unified re-exports so tests and users can import
// pidcone::estimators::approaches::* ergonomically.
pub use cone::{
    model_for, ClarabelSolver, ConeSolver, ConicProgram, JointDistribution, PairModel, QuadModel,
    SourcePair, Support,
};
