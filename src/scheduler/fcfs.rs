use super::{AlgorithmConfig, ConfigError, Policy};

/// First come, first served: every dispatched burst runs to completion.
pub struct Fcfs;

impl Policy for Fcfs {
    fn init(_config: &AlgorithmConfig) -> Result<Self, ConfigError> {
        Ok(Self)
    }

    fn name(&self) -> &'static str {
        "FCFS"
    }
}
