pub mod core;
pub mod scheduler;
pub mod sim;

pub use crate::core::{Burst, BurstKind, EventKind, Note, Pid, SimError, Ticks, TraceEntry};
pub use scheduler::{Algorithm, AlgorithmConfig, ConfigError, Policy};
pub use sim::{Completion, Job, Sim, SimulationReport, Workload, WorkloadError, simulate};
