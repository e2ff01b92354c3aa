use super::state::{QueueId, SimCtx, Ticks};

#[derive(Debug)]
pub struct Observer {
    step: u64,
    last_now: Ticks,
    last_stamps: Vec<Ticks>,
}

impl Observer {
    pub fn new(ctx: &SimCtx) -> Self {
        Self {
            step: 0,
            last_now: ctx.now,
            last_stamps: ctx.processes.iter().map(|p| p.time_stamp).collect(),
        }
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        self.step += 1;

        debug_assert!(
            ctx.now >= self.last_now,
            "step {}: clock went from {} back to {}",
            self.step,
            self.last_now,
            ctx.now
        );
        self.last_now = ctx.now;

        if let Some(holder) = ctx.cpu {
            debug_assert_eq!(
                ctx.queued_in(holder),
                Some(QueueId::Event),
                "CPU holder {holder} must have its next event pending"
            );
        }

        debug_assert_eq!(
            ctx.membership.len(),
            ctx.events.len() + ctx.ready.len(),
            "queue membership out of sync with the queues"
        );

        for (&pid, &queue) in &ctx.membership {
            let process = ctx.process(pid);
            debug_assert!(
                process.finish.is_none(),
                "Finished process {pid} still present in the {queue:?} queue"
            );
            let present = match queue {
                QueueId::Event => ctx.events.get_priority(&pid).is_some(),
                QueueId::Ready => ctx.ready.get_priority(&pid).is_some(),
            };
            debug_assert!(
                present,
                "membership claims process {pid} in the {queue:?} queue, but it is not there"
            );
        }

        for (process, last) in ctx.processes.iter().zip(self.last_stamps.iter_mut()) {
            debug_assert!(
                process.time_stamp >= *last,
                "Process {} time stamp went from {} back to {}",
                process.id,
                last,
                process.time_stamp
            );
            *last = process.time_stamp;
        }
    }
}
