pub mod approaches;
pub mod pid;
pub mod traits;

pub use pid::{
    pid, pid_distribution, Decomposition, Entropies, NumericalError, PidConfig, PidEstimator,
    PidOutcome, PidReport, SolverObject, UniqueInformation,
};
pub use traits::{ConeModel, Feasibility, Sources};
