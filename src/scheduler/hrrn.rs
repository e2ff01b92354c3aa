use super::{AlgorithmConfig, ConfigError, Policy, Predictor};
use crate::core::{Process, Ticks, Tiebreak};

/// Highest response ratio next. Non-preemptive; the ready process that has
/// waited longest relative to its expected service goes first.
pub struct Hrrn {
    predictor: Predictor,
}

impl Policy for Hrrn {
    fn init(config: &AlgorithmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            predictor: config.predictor()?,
        })
    }

    fn name(&self) -> &'static str {
        "HRRN"
    }

    fn admit(&mut self, process: &mut Process) {
        self.predictor.seed(process);
        process.response_ratio = Predictor::response_ratio(0, process.remaining_burst);
    }

    fn tiebreak(&self, process: &Process) -> Tiebreak {
        Tiebreak::HighestRatio(process.response_ratio)
    }

    fn reprioritize(&self, process: &mut Process, now: Ticks) {
        process.response_ratio =
            Predictor::response_ratio(process.waited(now), process.remaining_burst);
    }

    fn charge(&mut self, process: &mut Process, consumed: Ticks, completed: Option<Ticks>) {
        self.predictor.charge(process, consumed, completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Burst;

    #[test]
    fn ratio_grows_with_waiting() {
        let mut hrrn = Hrrn::init(&AlgorithmConfig::hrrn(0.5, true)).unwrap();
        let mut process = Process::new(1, 2, [Burst::cpu(4), Burst::io(1), Burst::cpu(4)]);
        hrrn.admit(&mut process);
        assert_eq!(process.remaining_burst, 8);
        assert_eq!(process.response_ratio, 1.0);

        hrrn.reprioritize(&mut process, 6);
        assert_eq!(process.response_ratio, 1.5);
    }
}
