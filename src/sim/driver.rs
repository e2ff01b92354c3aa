use super::{
    report::{Completion, SimulationReport},
    workload::Workload,
};
use crate::{
    core::{Engine, Inconsistency, SimError},
    scheduler::{Algorithm, AlgorithmConfig, Fcfs, Hrrn, Policy, Srt, Vrr},
};

pub struct Sim<P: Policy> {
    pub engine: Engine<P>,
    algorithm: Algorithm,
    completions: Vec<Completion>,
}

impl<P: Policy> Sim<P> {
    pub fn new(workload: &Workload, config: &AlgorithmConfig) -> Result<Self, SimError> {
        config.validate()?;
        let policy = P::init(config)?;

        Ok(Self {
            engine: Engine::new(workload.processes(), policy),
            algorithm: config.algorithm,
            completions: Vec::with_capacity(workload.len()),
        })
    }

    pub fn step(&mut self) -> Result<(), SimError> {
        let Some(pid) = self.engine.step()? else {
            return Ok(());
        };

        let process = self.engine.ctx.process(pid);
        let completion = Completion::from_process(process).ok_or(SimError::Consistency {
            pid,
            time: self.engine.now(),
            kind: Inconsistency::NeverDispatched,
        })?;
        self.completions.push(completion);
        Ok(())
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.engine.is_finished()
    }

    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    pub fn run(mut self) -> Result<SimulationReport, SimError> {
        while !self.all_jobs_completed() {
            self.step()?;
        }

        let finish_time = self.engine.now();
        log::info!(
            "{}: all {} processes finished at t={finish_time}",
            self.algorithm,
            self.completions.len()
        );
        Ok(SimulationReport::new(
            self.algorithm,
            self.completions,
            finish_time,
            self.engine.into_trace(),
        ))
    }
}

/// Runs `workload` under the configured algorithm. Feedback is not
/// implemented and yields no report.
pub fn simulate(
    workload: &Workload,
    config: &AlgorithmConfig,
) -> Result<Option<SimulationReport>, SimError> {
    let report = match config.algorithm {
        Algorithm::Fcfs => Sim::<Fcfs>::new(workload, config)?.run()?,
        Algorithm::Vrr => Sim::<Vrr>::new(workload, config)?.run()?,
        Algorithm::Srt => Sim::<Srt>::new(workload, config)?.run()?,
        Algorithm::Hrrn => Sim::<Hrrn>::new(workload, config)?.run()?,
        Algorithm::Feedback => {
            log::warn!(
                "{} scheduling is not implemented; nothing simulated",
                config.algorithm
            );
            return Ok(None);
        }
    };
    Ok(Some(report))
}
