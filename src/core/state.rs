use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::VecDeque;

use super::error::Inconsistency;

// Process ids start at 1 and follow workload order
pub type Pid = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BurstKind {
    Cpu,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    pub kind: BurstKind,
    pub duration: Ticks,
}

impl Burst {
    pub fn cpu(duration: Ticks) -> Self {
        Self {
            kind: BurstKind::Cpu,
            duration,
        }
    }

    pub fn io(duration: Ticks) -> Self {
        Self {
            kind: BurstKind::Io,
            duration,
        }
    }
}

/// The next thing that happens to a process once its time stamp is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Wants the CPU.
    Arrive,
    /// Holds the CPU and starts its IO burst when the event fires.
    Block,
    /// IO has completed.
    Unblock,
    /// No work left.
    Exit,
    /// Holds the CPU and loses it when its granted slice expires.
    Timeout,
}

impl EventKind {
    // Expiring bursts are handled before anything else due at the same instant
    pub fn rank(self) -> u8 {
        match self {
            Self::Timeout => 0,
            Self::Block => 1,
            Self::Arrive | Self::Unblock | Self::Exit => 2,
        }
    }
}

/// Policy-specific ordering between processes that tie on time and event kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tiebreak {
    Neutral,
    Shortest(Ticks),
    HighestRatio(f64),
}

impl Tiebreak {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Shortest(a), Self::Shortest(b)) => a.cmp(b),
            (Self::HighestRatio(a), Self::HighestRatio(b)) => b.total_cmp(a),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventKey {
    pub time: Ticks,
    pub kind: EventKind,
    pub tiebreak: Tiebreak,
    pub pid: Pid,
}

impl EventKey {
    fn order(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| self.tiebreak.compare(&other.tiebreak))
            .then_with(|| self.pid.cmp(&other.pid))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadyKey {
    pub tiebreak: Tiebreak,
    pub since: Ticks,
    pub pid: Pid,
}

impl ReadyKey {
    fn order(&self, other: &Self) -> Ordering {
        self.tiebreak
            .compare(&other.tiebreak)
            .then_with(|| self.since.cmp(&other.since))
            .then_with(|| self.pid.cmp(&other.pid))
    }
}

// KeyedPriorityQueue is a max-heap, so both keys flip their natural order
macro_rules! max_heap_order {
    ($key:ty) => {
        impl Ord for $key {
            fn cmp(&self, other: &Self) -> Ordering {
                other.order(self)
            }
        }

        impl PartialOrd for $key {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl PartialEq for $key {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other) == Ordering::Equal
            }
        }

        impl Eq for $key {}
    };
}

max_heap_order!(EventKey);
max_heap_order!(ReadyKey);

#[derive(Debug, Clone)]
pub struct Process {
    pub id: Pid,
    pub arrival: Ticks,
    pub time_stamp: Ticks,
    pub state: EventKind,
    pub bursts: VecDeque<Burst>,
    pub start: Option<Ticks>,
    pub finish: Option<Ticks>,
    pub service: Ticks,
    pub wait_total: Ticks,
    pub wait_count: u64,
    // None until the process first goes through IO or a timeout; waits are
    // then measured from the arrival time
    pub ready_since: Option<Ticks>,
    pub remaining_burst: Ticks,
    pub initial_cpu: Ticks,
    pub response_ratio: f64,
    // CPU time already granted to the burst at the front of `bursts`
    pub burst_progress: Ticks,
}

impl Process {
    pub fn new(id: Pid, arrival: Ticks, bursts: impl IntoIterator<Item = Burst>) -> Self {
        Self {
            id,
            arrival,
            time_stamp: arrival,
            state: EventKind::Arrive,
            bursts: bursts.into_iter().collect(),
            start: None,
            finish: None,
            service: 0,
            wait_total: 0,
            wait_count: 0,
            ready_since: None,
            remaining_burst: 0,
            initial_cpu: 0,
            response_ratio: 0.0,
            burst_progress: 0,
        }
    }

    pub fn has_work(&self) -> bool {
        !self.bursts.is_empty()
    }

    pub fn first_cpu(&self) -> Option<Ticks> {
        self.bursts
            .iter()
            .find(|burst| burst.kind == BurstKind::Cpu)
            .map(|burst| burst.duration)
    }

    pub fn cpu_total(&self) -> Ticks {
        self.bursts
            .iter()
            .filter(|burst| burst.kind == BurstKind::Cpu)
            .map(|burst| burst.duration)
            .sum()
    }

    pub fn waited(&self, now: Ticks) -> Ticks {
        now.saturating_sub(self.ready_since.unwrap_or(self.arrival))
    }

    // Zero-length waits do not count towards the response-time average
    pub fn record_wait(&mut self, wait: Ticks) {
        if wait > 0 {
            self.wait_total += wait;
            self.wait_count += 1;
        }
    }

    pub fn take_burst(
        &mut self,
        event: EventKind,
        expected: BurstKind,
    ) -> Result<Burst, Inconsistency> {
        match self.bursts.front().copied() {
            Some(burst) if burst.kind == expected => {
                self.bursts.pop_front();
                Ok(burst)
            }
            found => Err(Inconsistency::UnexpectedBurst {
                event,
                expected,
                found: found.map(|burst| burst.kind),
            }),
        }
    }

    /// Grants `slice` units of CPU to `burst`, which must have just been taken
    /// off the front of the sequence. An unfinished remainder goes back to the
    /// front. Returns the burst's full length once it has been consumed.
    pub fn run_cpu(&mut self, burst: Burst, slice: Ticks) -> Option<Ticks> {
        debug_assert_eq!(burst.kind, BurstKind::Cpu);
        debug_assert!(slice <= burst.duration, "slice exceeds burst");

        self.service += slice;
        self.burst_progress += slice;

        if slice < burst.duration {
            self.bursts.push_front(Burst::cpu(burst.duration - slice));
            return None;
        }

        let full = self.burst_progress;
        self.burst_progress = 0;
        Some(full)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueId {
    Event,
    Ready,
}

#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    // The process holding the CPU, or the one it has been handed to
    pub cpu: Option<Pid>,
    pub processes: Vec<Process>,
    pub events: KeyedPriorityQueue<Pid, EventKey>,
    pub ready: KeyedPriorityQueue<Pid, ReadyKey>,
    pub membership: FxHashMap<Pid, QueueId>,
}

impl SimCtx {
    pub fn new(processes: Vec<Process>) -> Self {
        debug_assert!(
            processes
                .iter()
                .enumerate()
                .all(|(index, process)| process.id == index + 1),
            "Process ids must be 1-based and dense"
        );

        Self {
            now: 0,
            cpu: None,
            processes,
            events: KeyedPriorityQueue::new(),
            ready: KeyedPriorityQueue::new(),
            membership: FxHashMap::default(),
        }
    }

    pub fn process(&self, pid: Pid) -> &Process {
        &self.processes[pid - 1]
    }

    pub fn process_mut(&mut self, pid: Pid) -> &mut Process {
        &mut self.processes[pid - 1]
    }

    pub fn advance_to(&mut self, time: Ticks) {
        debug_assert!(time >= self.now, "clock moved backwards: {} -> {time}", self.now);
        self.now = time;
    }

    fn enter(&mut self, pid: Pid, queue: QueueId) {
        assert!(
            !self.membership.contains_key(&pid),
            "Process {pid} already present in the {:?} queue",
            self.membership[&pid]
        );
        self.membership.insert(pid, queue);
    }

    fn leave(&mut self, pid: Pid) {
        let removed = self.membership.remove(&pid);
        debug_assert!(removed.is_some(), "Process {pid} missing queue membership");
    }

    pub fn push_event(&mut self, pid: Pid, key: EventKey) {
        debug_assert_eq!(key.pid, pid);
        self.enter(pid, QueueId::Event);
        self.events.push(pid, key);
    }

    pub fn pop_event(&mut self) -> Option<(Pid, EventKey)> {
        let (pid, key) = self.events.pop()?;
        self.leave(pid);
        Some((pid, key))
    }

    pub fn next_event_time(&self) -> Option<Ticks> {
        self.events.peek().map(|(_, key)| key.time)
    }

    pub fn push_ready(&mut self, pid: Pid, key: ReadyKey) {
        debug_assert_eq!(key.pid, pid);
        debug_assert_ne!(self.cpu, Some(pid), "CPU holder {pid} cannot wait for the CPU");
        self.enter(pid, QueueId::Ready);
        self.ready.push(pid, key);
    }

    pub fn pop_ready(&mut self) -> Option<Pid> {
        let (pid, _) = self.ready.pop()?;
        self.leave(pid);
        Some(pid)
    }

    pub fn ready_pids(&self) -> Vec<Pid> {
        self.ready.iter().map(|(pid, _)| *pid).collect()
    }

    pub fn set_ready_key(&mut self, pid: Pid, key: ReadyKey) {
        let updated = self.ready.set_priority(&pid, key);
        debug_assert!(updated.is_ok(), "Process {pid} is not in the ready queue");
    }

    pub fn queued_in(&self, pid: Pid) -> Option<QueueId> {
        self.membership.get(&pid).copied()
    }

    pub fn is_drained(&self) -> bool {
        self.events.is_empty() && self.ready.is_empty()
    }

    // The CPU goes to whoever it was handed to, otherwise to an arrival only
    // when nobody is already waiting for it
    pub fn cpu_free_for(&self, pid: Pid) -> bool {
        match self.cpu {
            Some(holder) => holder == pid,
            None => self.ready.is_empty(),
        }
    }
}
