use std::fmt;

use super::state::{BurstKind, EventKind, Pid, Ticks};
use crate::scheduler::ConfigError;

/// A broken engine invariant. Always a logic defect, never recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    UnexpectedBurst {
        event: EventKind,
        expected: BurstKind,
        found: Option<BurstKind>,
    },
    CpuNotHeld {
        event: EventKind,
        holder: Option<Pid>,
    },
    NeverDispatched,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedBurst {
                event,
                expected,
                found: Some(found),
            } => write!(f, "{event:?} expected a {expected:?} burst but found {found:?}"),
            Self::UnexpectedBurst {
                event,
                expected,
                found: None,
            } => write!(f, "{event:?} expected a {expected:?} burst but none are left"),
            Self::CpuNotHeld {
                event,
                holder: Some(holder),
            } => write!(f, "{event:?} without holding the CPU (held by {holder})"),
            Self::CpuNotHeld {
                event,
                holder: None,
            } => write!(f, "{event:?} without holding the CPU (idle)"),
            Self::NeverDispatched => write!(f, "exited without ever being dispatched"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    Config(ConfigError),
    Consistency {
        pid: Pid,
        time: Ticks,
        kind: Inconsistency,
    },
    // Processes are waiting for the CPU but no event can ever hand it over
    Stalled {
        time: Ticks,
        waiting: usize,
    },
}

impl SimError {
    pub fn consistency(pid: Pid, time: Ticks, kind: Inconsistency) -> Self {
        Self::Consistency { pid, time, kind }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Consistency { pid, time, kind } => {
                write!(f, "internal inconsistency at t={time}: process {pid} {kind}")
            }
            Self::Stalled { time, waiting } => write!(
                f,
                "stalled at t={time}: {waiting} processes wait for a CPU nobody releases"
            ),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
