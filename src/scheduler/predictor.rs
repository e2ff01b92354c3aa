use super::ConfigError;
use crate::core::{Process, Ticks};

/// Source of each process's remaining-CPU figure for SRT and HRRN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predictor {
    /// Sum of every CPU burst still ahead of the process. An oracle no real
    /// scheduler has, kept for idealized comparison.
    Exact,
    /// Exponential average of observed bursts weighted by `alpha`.
    Exponential { alpha: f64 },
}

impl Predictor {
    pub fn new(alpha: f64, service_given: bool) -> Result<Self, ConfigError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::AlphaOutOfRange(alpha));
        }
        Ok(if service_given {
            Self::Exact
        } else {
            Self::Exponential { alpha }
        })
    }

    pub fn seed(&self, process: &mut Process) {
        process.initial_cpu = process.first_cpu().unwrap_or(0);
        process.remaining_burst = match self {
            Self::Exact => process.cpu_total(),
            // alpha * d + (1 - alpha) * d
            Self::Exponential { .. } => process.initial_cpu,
        };
    }

    pub fn charge(&self, process: &mut Process, consumed: Ticks, completed: Option<Ticks>) {
        process.remaining_burst = process.remaining_burst.saturating_sub(consumed);

        // Blends with the first burst's length, not the running estimate
        if let (Self::Exponential { alpha }, Some(actual)) = (self, completed) {
            process.remaining_burst = blend(*alpha, actual, process.initial_cpu);
        }
    }

    pub fn response_ratio(waited: Ticks, estimate: Ticks) -> f64 {
        if estimate == 0 {
            return f64::INFINITY;
        }
        waited as f64 / estimate as f64 + 1.0
    }
}

fn blend(alpha: f64, actual: Ticks, previous: Ticks) -> Ticks {
    (alpha * actual as f64 + (1.0 - alpha) * previous as f64) as Ticks
}
