use super::{AlgorithmConfig, ConfigError, Policy};
use crate::core::{Process, Ticks};

/// Round robin with a fixed quantum. A burst longer than the quantum is cut
/// at the quantum and the rest waits its turn behind everyone already ready.
pub struct Vrr {
    quantum: Ticks,
}

impl Vrr {
    pub fn quantum(&self) -> Ticks {
        self.quantum
    }
}

impl Policy for Vrr {
    fn init(config: &AlgorithmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            quantum: config.quantum()?,
        })
    }

    fn name(&self) -> &'static str {
        "VRR"
    }

    fn slice(
        &self,
        _process: &Process,
        burst: Ticks,
        _now: Ticks,
        _next_event: Option<Ticks>,
    ) -> Ticks {
        burst.min(self.quantum)
    }

    fn preemptive(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Burst;

    #[test]
    fn slices_never_exceed_the_quantum() {
        let vrr = Vrr::init(&AlgorithmConfig::vrr(3)).unwrap();
        let process = Process::new(1, 0, [Burst::cpu(7)]);
        assert_eq!(vrr.quantum(), 3);

        assert_eq!(vrr.slice(&process, 7, 0, None), 3);
        assert_eq!(vrr.slice(&process, 3, 0, None), 3);
        assert_eq!(vrr.slice(&process, 1, 0, Some(0)), 1);
    }

    #[test]
    fn quantum_is_required() {
        let mut config = AlgorithmConfig::vrr(2);
        config.quantum = None;
        assert_eq!(Vrr::init(&config).err(), Some(ConfigError::MissingKey("quantum")));
    }
}
