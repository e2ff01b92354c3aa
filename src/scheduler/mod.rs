pub mod config;
pub mod fcfs;
pub mod hrrn;
pub mod predictor;
pub mod srt;
pub mod vrr;

use crate::core::{Process, Ticks, Tiebreak};
pub use config::{Algorithm, AlgorithmConfig, ConfigError};
pub use fcfs::Fcfs;
pub use hrrn::Hrrn;
pub use predictor::Predictor;
pub use srt::Srt;
pub use vrr::Vrr;

/// The per-algorithm part of the simulation: ordering, preemption and
/// prediction. The engine owns every process and queue; a policy only reads
/// and updates the process it is handed.
pub trait Policy {
    fn init(config: &AlgorithmConfig) -> Result<Self, ConfigError>
    where
        Self: Sized;

    fn name(&self) -> &'static str;

    /// Called once per process before its arrival is queued.
    fn admit(&mut self, _process: &mut Process) {}

    /// Secondary key between processes due at the same time with the same
    /// event rank, and primary key of the ready queue.
    fn tiebreak(&self, _process: &Process) -> Tiebreak {
        Tiebreak::Neutral
    }

    /// Refreshes ordering state that depends on the clock. Runs on every
    /// arrival and on every ready process before one of them is promoted.
    fn reprioritize(&self, _process: &mut Process, _now: Ticks) {}

    /// How much of a `burst`-long CPU burst to grant on dispatch.
    /// `next_event` is the time of the earliest other pending event.
    fn slice(
        &self,
        _process: &Process,
        burst: Ticks,
        _now: Ticks,
        _next_event: Option<Ticks>,
    ) -> Ticks {
        burst
    }

    /// Whether TIMEOUT events move the process back to the ready queue.
    /// Non-preemptive policies never schedule one and ignore any that fire.
    fn preemptive(&self) -> bool {
        false
    }

    /// Called after `consumed` units of CPU were granted. `completed` carries
    /// the burst's full length once the burst is done.
    fn charge(&mut self, _process: &mut Process, _consumed: Ticks, _completed: Option<Ticks>) {}
}
