use super::{AlgorithmConfig, ConfigError, Policy, Predictor};
use crate::core::{Process, Ticks, Tiebreak};

/// Shortest remaining time. The running burst is cut short whenever another
/// event falls due before it would finish, so the shorter job gets a chance
/// to take over.
pub struct Srt {
    predictor: Predictor,
}

impl Policy for Srt {
    fn init(config: &AlgorithmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            predictor: config.predictor()?,
        })
    }

    fn name(&self) -> &'static str {
        "SRT"
    }

    fn admit(&mut self, process: &mut Process) {
        self.predictor.seed(process);
    }

    fn tiebreak(&self, process: &Process) -> Tiebreak {
        Tiebreak::Shortest(process.remaining_burst)
    }

    fn slice(
        &self,
        _process: &Process,
        burst: Ticks,
        now: Ticks,
        next_event: Option<Ticks>,
    ) -> Ticks {
        match next_event {
            Some(next) if next > now && now + burst > next => next - now,
            _ => burst,
        }
    }

    fn preemptive(&self) -> bool {
        true
    }

    fn charge(&mut self, process: &mut Process, consumed: Ticks, completed: Option<Ticks>) {
        self.predictor.charge(process, consumed, completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Burst;

    fn srt() -> Srt {
        Srt::init(&AlgorithmConfig::srt(0.5, true)).unwrap()
    }

    #[test]
    fn burst_is_cut_at_the_next_event() {
        let process = Process::new(1, 0, [Burst::cpu(8)]);
        assert_eq!(srt().slice(&process, 8, 0, Some(2)), 2);
        assert_eq!(srt().slice(&process, 8, 3, Some(11)), 8);
        assert_eq!(srt().slice(&process, 8, 3, Some(12)), 8);
    }

    #[test]
    fn simultaneous_events_do_not_preempt() {
        let process = Process::new(1, 0, [Burst::cpu(8)]);
        assert_eq!(srt().slice(&process, 8, 4, Some(4)), 8);
        assert_eq!(srt().slice(&process, 8, 4, None), 8);
    }
}
