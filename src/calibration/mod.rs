pub mod objective;
pub mod optimizer;
pub mod params;
pub mod simulator;
pub mod sweep;

pub use objective::CalibrationObjective;
pub use optimizer::{CalibrationOutcome, Optimizer, RandomSearch, Trial};
pub use params::{Bound, ParamGrid, SearchSpace, SimParams};
pub use simulator::{CommandSimulator, Simulator};
pub use sweep::{run_sweep, write_sweep, write_sweep_csv, SweepRecord};
