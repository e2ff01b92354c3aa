use average::Estimate;
use std::fmt;

use crate::core::{Pid, Process, Ticks, TraceEntry};
use crate::scheduler::Algorithm;

/// Final statistics of one process, taken when it exits.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub pid: Pid,
    pub arrival: Ticks,
    pub start: Ticks,
    pub finish: Ticks,
    pub service: Ticks,
    pub turnaround: Ticks,
    // None when the process never received CPU time
    pub normalized_turnaround: Option<f64>,
    pub average_response: f64,
}

impl Completion {
    pub fn from_process(process: &Process) -> Option<Self> {
        let start = process.start?;
        let finish = process.finish?;
        let turnaround = finish - process.arrival;

        let normalized_turnaround = if process.service == 0 {
            log::warn!(
                "process {} received no CPU time; normalized turnaround is undefined",
                process.id
            );
            None
        } else {
            Some(turnaround as f64 / process.service as f64)
        };
        let average_response = if process.wait_count == 0 {
            0.0
        } else {
            process.wait_total as f64 / process.wait_count as f64
        };

        Some(Self {
            pid: process.id,
            arrival: process.arrival,
            start,
            finish,
            service: process.service,
            turnaround,
            normalized_turnaround,
            average_response,
        })
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Process {}: arrival={} start={} finish={} service={} turnaround={} ",
            self.pid, self.arrival, self.start, self.finish, self.service, self.turnaround
        )?;
        match self.normalized_turnaround {
            Some(normalized) => write!(f, "normalized={normalized:.2} ")?,
            None => write!(f, "normalized=undefined ")?,
        }
        write!(f, "response={:.2}", self.average_response)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub algorithm: Algorithm,
    pub completions: Vec<Completion>,
    pub mean_turnaround: f64,
    // Undefined per-process values count as zero
    pub mean_normalized_turnaround: f64,
    pub mean_average_response: f64,
    pub finish_time: Ticks,
    pub trace: Vec<TraceEntry>,
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    let mean = iter.collect::<average::Mean>();
    if mean.is_empty() { 0.0 } else { mean.estimate() }
}

impl SimulationReport {
    pub fn new(
        algorithm: Algorithm,
        mut completions: Vec<Completion>,
        finish_time: Ticks,
        trace: Vec<TraceEntry>,
    ) -> Self {
        completions.sort_by_key(|completion| completion.pid);

        let mean_turnaround = avg(completions.iter().map(|c| c.turnaround as f64));
        let mean_normalized_turnaround = avg(
            completions
                .iter()
                .map(|c| c.normalized_turnaround.unwrap_or(0.0)),
        );
        let mean_average_response = avg(completions.iter().map(|c| c.average_response));

        Self {
            algorithm,
            completions,
            mean_turnaround,
            mean_normalized_turnaround,
            mean_average_response,
            finish_time,
            trace,
        }
    }

    pub fn completion(&self, pid: Pid) -> Option<&Completion> {
        self.completions
            .binary_search_by_key(&pid, |completion| completion.pid)
            .ok()
            .map(|index| &self.completions[index])
    }

    pub fn total_service(&self) -> Ticks {
        self.completions.iter().map(|c| c.service).sum()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} finished in {} units of time", self.algorithm, self.finish_time)?;
        for completion in &self.completions {
            writeln!(f, "{completion}")?;
        }
        writeln!(f, "Mean turnaround: {:.2}", self.mean_turnaround)?;
        writeln!(
            f,
            "Mean normalized turnaround: {:.2}",
            self.mean_normalized_turnaround
        )?;
        write!(f, "Mean average response time: {:.2}", self.mean_average_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Burst;

    fn finished(id: Pid, arrival: Ticks, start: Ticks, finish: Ticks, service: Ticks) -> Process {
        let mut process = Process::new(id, arrival, [Burst::cpu(service)]);
        process.start = Some(start);
        process.finish = Some(finish);
        process.service = service;
        process
    }

    #[test]
    fn completion_statistics() {
        let mut process = finished(1, 2, 4, 12, 4);
        process.record_wait(2);
        process.record_wait(0);
        process.record_wait(4);

        let completion = Completion::from_process(&process).unwrap();
        assert_eq!(completion.turnaround, 10);
        assert_eq!(completion.normalized_turnaround, Some(2.5));
        assert_eq!(completion.average_response, 3.0);
    }

    #[test]
    fn zero_service_leaves_normalized_turnaround_undefined() {
        let completion = Completion::from_process(&finished(1, 3, 3, 3, 0)).unwrap();
        assert_eq!(completion.turnaround, 0);
        assert_eq!(completion.normalized_turnaround, None);
        assert_eq!(completion.average_response, 0.0);
    }

    #[test]
    fn unfinished_processes_have_no_completion() {
        assert!(Completion::from_process(&Process::new(1, 0, [Burst::cpu(1)])).is_none());
    }

    #[test]
    fn means_divide_by_every_process() {
        let completions = vec![
            Completion::from_process(&finished(2, 0, 0, 0, 0)).unwrap(),
            Completion::from_process(&finished(1, 0, 0, 6, 3)).unwrap(),
        ];
        let report = SimulationReport::new(Algorithm::Fcfs, completions, 6, Vec::new());

        assert_eq!(report.completions[0].pid, 1);
        assert_eq!(report.mean_turnaround, 3.0);
        assert_eq!(report.mean_normalized_turnaround, 1.0);
        assert_eq!(report.completion(2).map(|c| c.finish), Some(0));
        assert_eq!(report.total_service(), 3);
    }

    #[test]
    fn empty_report_has_zero_means() {
        let report = SimulationReport::new(Algorithm::Hrrn, Vec::new(), 0, Vec::new());
        assert_eq!(report.mean_turnaround, 0.0);
        assert_eq!(report.mean_average_response, 0.0);
    }
}
