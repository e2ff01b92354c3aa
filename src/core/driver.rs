use super::{
    error::{Inconsistency, SimError},
    event::{Note, TraceEntry},
    observer::Observer,
    state::{BurstKind, EventKey, EventKind, Pid, Process, ReadyKey, SimCtx, Ticks},
};
use crate::scheduler::Policy;

pub struct Engine<P: Policy> {
    pub ctx: SimCtx,
    pub policy: P,
    observer: Observer,
    trace: Vec<TraceEntry>,
}

fn event_key<P: Policy>(policy: &P, process: &Process) -> EventKey {
    EventKey {
        time: process.time_stamp,
        kind: process.state,
        tiebreak: policy.tiebreak(process),
        pid: process.id,
    }
}

fn ready_key<P: Policy>(policy: &P, process: &Process) -> ReadyKey {
    ReadyKey {
        tiebreak: policy.tiebreak(process),
        since: process.time_stamp,
        pid: process.id,
    }
}

impl<P: Policy> Engine<P> {
    pub fn new(mut processes: Vec<Process>, mut policy: P) -> Self {
        for process in &mut processes {
            policy.admit(process);
        }

        let mut ctx = SimCtx::new(processes);
        for pid in 1..=ctx.processes.len() {
            let key = event_key(&policy, ctx.process(pid));
            ctx.push_event(pid, key);
        }
        log::info!(
            "{}: simulating {} processes",
            policy.name(),
            ctx.processes.len()
        );

        let observer = Observer::new(&ctx);
        Self {
            ctx,
            policy,
            observer,
            trace: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ctx.is_drained()
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn into_trace(self) -> Vec<TraceEntry> {
        self.trace
    }

    /// Handles the earliest pending event. Returns the id of the process
    /// that exited, if any.
    pub fn step(&mut self) -> Result<Option<Pid>, SimError> {
        self.promote_ready();

        let Some((pid, key)) = self.ctx.pop_event() else {
            if self.ctx.ready.is_empty() {
                return Ok(None);
            }
            return Err(SimError::Stalled {
                time: self.ctx.now,
                waiting: self.ctx.ready.len(),
            });
        };
        self.ctx.advance_to(key.time);
        debug_assert_eq!(self.ctx.process(pid).state, key.kind);

        let exited = match key.kind {
            EventKind::Arrive => self.arrive(pid).map(|_| None),
            EventKind::Block => self.block(pid).map(|_| None),
            EventKind::Unblock => self.unblock(pid).map(|_| None),
            EventKind::Timeout => self.timeout(pid).map(|_| None),
            EventKind::Exit => self.exit(pid).map(Some),
        }?;

        self.observer.observe(&self.ctx);
        Ok(exited)
    }

    // The CPU is handed over only once everything due at this instant has been
    // handled, so simultaneous arrivals compete under the policy's ordering
    fn promote_ready(&mut self) {
        let now = self.ctx.now;
        if self.ctx.cpu.is_some()
            || self.ctx.ready.is_empty()
            || self.ctx.next_event_time() == Some(now)
        {
            return;
        }

        for pid in self.ctx.ready_pids() {
            self.policy.reprioritize(self.ctx.process_mut(pid), now);
            let key = ready_key(&self.policy, self.ctx.process(pid));
            self.ctx.set_ready_key(pid, key);
        }

        let Some(pid) = self.ctx.pop_ready() else {
            return;
        };
        let process = self.ctx.process_mut(pid);
        let waited = now - process.time_stamp;
        process.time_stamp = now;
        let kind = process.state;
        // A process that only has to exit does not need the CPU
        if kind == EventKind::Arrive {
            self.ctx.cpu = Some(pid);
        }
        let key = event_key(&self.policy, self.ctx.process(pid));
        self.ctx.push_event(pid, key);
        self.record(pid, kind, Note::Promoted { waited });
    }

    fn arrive(&mut self, pid: Pid) -> Result<(), SimError> {
        let now = self.ctx.now;
        self.policy.reprioritize(self.ctx.process_mut(pid), now);

        if !self.ctx.cpu_free_for(pid) {
            let key = ready_key(&self.policy, self.ctx.process(pid));
            self.ctx.push_ready(pid, key);
            self.record(pid, EventKind::Arrive, Note::Queued);
            return Ok(());
        }

        self.dispatch(pid)
    }

    fn dispatch(&mut self, pid: Pid) -> Result<(), SimError> {
        let now = self.ctx.now;
        let next_event = self.ctx.next_event_time();
        self.ctx.cpu = Some(pid);

        let process = self.ctx.process_mut(pid);
        let burst = process
            .take_burst(EventKind::Arrive, BurstKind::Cpu)
            .map_err(|kind| SimError::consistency(pid, now, kind))?;
        process.start.get_or_insert(now);
        let waited = process.waited(now);
        process.record_wait(waited);

        let slice = self
            .policy
            .slice(process, burst.duration, now, next_event)
            .min(burst.duration);
        let completed = process.run_cpu(burst, slice);
        self.policy.charge(process, slice, completed);

        process.time_stamp = now + slice;
        process.state = match completed {
            None => EventKind::Timeout,
            Some(_) if process.has_work() => EventKind::Block,
            Some(_) => EventKind::Exit,
        };

        let key = event_key(&self.policy, self.ctx.process(pid));
        self.ctx.push_event(pid, key);
        self.record(pid, EventKind::Arrive, Note::Dispatched { slice, waited });
        Ok(())
    }

    fn block(&mut self, pid: Pid) -> Result<(), SimError> {
        let now = self.ctx.now;
        self.release_cpu(pid, EventKind::Block)?;

        let process = self.ctx.process_mut(pid);
        let io = process
            .take_burst(EventKind::Block, BurstKind::Io)
            .map_err(|kind| SimError::consistency(pid, now, kind))?;
        let until = now + io.duration;
        // The next dispatch wait is measured from the moment IO completes
        process.ready_since = Some(until);
        process.time_stamp = until;
        process.state = EventKind::Unblock;

        let key = event_key(&self.policy, self.ctx.process(pid));
        self.ctx.push_event(pid, key);
        self.record(pid, EventKind::Block, Note::Blocked { until });
        Ok(())
    }

    fn unblock(&mut self, pid: Pid) -> Result<(), SimError> {
        let now = self.ctx.now;
        let process = self.ctx.process_mut(pid);
        match process.bursts.front() {
            None => process.state = EventKind::Exit,
            Some(burst) if burst.kind == BurstKind::Cpu => process.state = EventKind::Arrive,
            Some(burst) => {
                return Err(SimError::consistency(
                    pid,
                    now,
                    Inconsistency::UnexpectedBurst {
                        event: EventKind::Unblock,
                        expected: BurstKind::Cpu,
                        found: Some(burst.kind),
                    },
                ));
            }
        }
        process.ready_since = Some(now);
        self.record(pid, EventKind::Unblock, Note::Unblocked);

        if self.ctx.cpu_free_for(pid) {
            let key = event_key(&self.policy, self.ctx.process(pid));
            self.ctx.push_event(pid, key);
        } else {
            let kind = self.ctx.process(pid).state;
            let key = ready_key(&self.policy, self.ctx.process(pid));
            self.ctx.push_ready(pid, key);
            self.record(pid, kind, Note::Queued);
        }
        Ok(())
    }

    fn timeout(&mut self, pid: Pid) -> Result<(), SimError> {
        if !self.policy.preemptive() {
            log::warn!(
                "{}: ignoring timeout of process {pid} at t={}",
                self.policy.name(),
                self.ctx.now
            );
            self.record(pid, EventKind::Timeout, Note::TimeoutIgnored);
            return Ok(());
        }

        let now = self.ctx.now;
        self.release_cpu(pid, EventKind::Timeout)?;

        // The unserved remainder is already back at the front of the bursts
        let process = self.ctx.process_mut(pid);
        let remaining = process.bursts.front().map_or(0, |burst| burst.duration);
        process.state = EventKind::Arrive;
        process.ready_since = Some(now);

        let key = ready_key(&self.policy, self.ctx.process(pid));
        self.ctx.push_ready(pid, key);
        self.record(pid, EventKind::Timeout, Note::Preempted { remaining });
        Ok(())
    }

    fn exit(&mut self, pid: Pid) -> Result<Pid, SimError> {
        let now = self.ctx.now;
        if self.ctx.cpu == Some(pid) {
            self.ctx.cpu = None;
        }

        let process = self.ctx.process_mut(pid);
        if process.start.is_none() {
            return Err(SimError::consistency(pid, now, Inconsistency::NeverDispatched));
        }
        debug_assert!(process.finish.is_none(), "Process {pid} finished twice");
        process.finish = Some(now);

        self.record(pid, EventKind::Exit, Note::Finished);
        Ok(pid)
    }

    fn release_cpu(&mut self, pid: Pid, event: EventKind) -> Result<(), SimError> {
        if self.ctx.cpu != Some(pid) {
            return Err(SimError::consistency(
                pid,
                self.ctx.now,
                Inconsistency::CpuNotHeld {
                    event,
                    holder: self.ctx.cpu,
                },
            ));
        }
        self.ctx.cpu = None;
        Ok(())
    }

    fn record(&mut self, pid: Pid, kind: EventKind, note: Note) {
        let entry = TraceEntry {
            time: self.ctx.now,
            pid,
            kind,
            note,
        };
        log::debug!("{entry}");
        self.trace.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Burst;
    use crate::scheduler::{AlgorithmConfig, Fcfs, Vrr};

    fn run<P: Policy>(engine: &mut Engine<P>) -> Result<Vec<Pid>, SimError> {
        let mut exited = Vec::new();
        while !engine.is_finished() {
            if let Some(pid) = engine.step()? {
                exited.push(pid);
            }
        }
        Ok(exited)
    }

    fn fcfs() -> Fcfs {
        Fcfs::init(&AlgorithmConfig::fcfs()).unwrap()
    }

    #[test]
    fn two_cpu_bursts_in_a_row_are_fatal() {
        let processes = vec![Process::new(1, 0, [Burst::cpu(2), Burst::cpu(3)])];
        let mut engine = Engine::new(processes, fcfs());

        let err = run(&mut engine).unwrap_err();
        assert_eq!(
            err,
            SimError::Consistency {
                pid: 1,
                time: 2,
                kind: Inconsistency::UnexpectedBurst {
                    event: EventKind::Block,
                    expected: BurstKind::Io,
                    found: Some(BurstKind::Cpu),
                },
            }
        );
    }

    #[test]
    fn leading_io_burst_is_fatal() {
        let processes = vec![Process::new(1, 3, [Burst::io(2), Burst::cpu(1)])];
        let mut engine = Engine::new(processes, fcfs());

        let err = run(&mut engine).unwrap_err();
        assert!(matches!(
            err,
            SimError::Consistency {
                pid: 1,
                time: 3,
                kind: Inconsistency::UnexpectedBurst {
                    event: EventKind::Arrive,
                    expected: BurstKind::Cpu,
                    found: Some(BurstKind::Io),
                },
            }
        ));
    }

    #[test]
    fn io_completion_waits_for_the_busy_cpu() {
        let processes = vec![
            Process::new(1, 0, [Burst::cpu(1), Burst::io(1), Burst::cpu(1)]),
            Process::new(2, 0, [Burst::cpu(5)]),
        ];
        let mut engine = Engine::new(processes, fcfs());

        assert_eq!(run(&mut engine).unwrap(), vec![2, 1]);
        // P1 is back from IO at 2 but P2 holds the CPU until 6
        let p1 = engine.ctx.process(1);
        assert_eq!(p1.finish, Some(7));
        assert_eq!(p1.wait_total, 4);
        assert_eq!(p1.wait_count, 1);
        let queued = TraceEntry {
            time: 2,
            pid: 1,
            kind: EventKind::Arrive,
            note: Note::Queued,
        };
        assert!(engine.trace().contains(&queued));
    }

    #[test]
    fn timeout_requeues_behind_waiting_processes() {
        let processes = vec![
            Process::new(1, 0, [Burst::cpu(3)]),
            Process::new(2, 1, [Burst::cpu(1)]),
        ];
        let vrr = Vrr::init(&AlgorithmConfig::vrr(2)).unwrap();
        let mut engine = Engine::new(processes, vrr);

        assert_eq!(run(&mut engine).unwrap(), vec![2, 1]);
        let dispatches: Vec<(Ticks, Pid, Ticks)> = engine
            .trace()
            .iter()
            .filter_map(|entry| match entry.note {
                Note::Dispatched { slice, .. } => Some((entry.time, entry.pid, slice)),
                _ => None,
            })
            .collect();
        assert_eq!(dispatches, vec![(0, 1, 2), (2, 2, 1), (3, 1, 1)]);
        assert!(engine.ctx.cpu.is_none());
    }
}
