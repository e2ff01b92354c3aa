pub mod driver;
pub mod error;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::Engine;
pub use error::{Inconsistency, SimError};
pub use event::{Note, TraceEntry};
pub use state::{
    Burst, BurstKind, EventKey, EventKind, Pid, Process, QueueId, ReadyKey, SimCtx, Ticks,
    Tiebreak,
};
