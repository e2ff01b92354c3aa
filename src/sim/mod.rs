pub mod driver;
pub mod report;
pub mod workload;

pub use driver::{Sim, simulate};
pub use report::{Completion, SimulationReport};
pub use workload::{Job, Workload, WorkloadError};
