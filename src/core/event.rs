use std::fmt;

use crate::core::{EventKind, Pid, Ticks};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Note {
    Dispatched { slice: Ticks, waited: Ticks },
    // CPU busy; parked in the ready queue
    Queued,
    Promoted { waited: Ticks },
    Blocked { until: Ticks },
    Unblocked,
    Preempted { remaining: Ticks },
    Finished,
    TimeoutIgnored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceEntry {
    pub time: Ticks,
    pub pid: Pid,
    pub kind: EventKind,
    pub note: Note,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} P{} {:?}: ", self.time, self.pid, self.kind)?;
        match self.note {
            Note::Dispatched { slice, waited } => {
                write!(f, "runs for {slice} after waiting {waited}")
            }
            Note::Queued => write!(f, "CPU busy, waits in the ready queue"),
            Note::Promoted { waited } => write!(f, "leaves the ready queue after {waited}"),
            Note::Blocked { until } => write!(f, "blocked on IO until {until}"),
            Note::Unblocked => write!(f, "IO complete"),
            Note::Preempted { remaining } => {
                write!(f, "slice expired with {remaining} left in the burst")
            }
            Note::Finished => write!(f, "finished"),
            Note::TimeoutIgnored => write!(f, "timeout ignored by a non-preemptive policy"),
        }
    }
}
