use std::fmt;
use std::str::FromStr;

use crate::core::{Burst, BurstKind, Process, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub arrival: Ticks,
    pub bursts: Vec<Burst>,
}

impl Job {
    pub fn new(arrival: Ticks, bursts: impl IntoIterator<Item = Burst>) -> Self {
        Self {
            arrival,
            bursts: bursts.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    EmptyBursts { process: usize },
    MustStartWithCpu { process: usize },
    NonAlternating { process: usize, index: usize },
    Malformed { line: usize, reason: String },
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBursts { process } => write!(f, "process {process} has no bursts"),
            Self::MustStartWithCpu { process } => {
                write!(f, "process {process} must start with a CPU burst")
            }
            Self::NonAlternating { process, index } => write!(
                f,
                "process {process}: burst {index} has the same kind as the one before it"
            ),
            Self::Malformed { line, reason } => write!(f, "line {line}: {reason}"),
        }
    }
}

impl std::error::Error for WorkloadError {}

/// Processes to simulate, in id order: the first job becomes process 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workload {
    jobs: Vec<Job>,
}

impl Workload {
    pub fn new(jobs: Vec<Job>) -> Result<Self, WorkloadError> {
        for (index, job) in jobs.iter().enumerate() {
            let process = index + 1;
            match job.bursts.first() {
                None => return Err(WorkloadError::EmptyBursts { process }),
                Some(burst) if burst.kind != BurstKind::Cpu => {
                    return Err(WorkloadError::MustStartWithCpu { process });
                }
                Some(_) => {}
            }
            if let Some(index) = job
                .bursts
                .windows(2)
                .position(|pair| pair[0].kind == pair[1].kind)
            {
                return Err(WorkloadError::NonAlternating {
                    process,
                    index: index + 1,
                });
            }
        }
        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn total_cpu(&self) -> Ticks {
        self.jobs
            .iter()
            .flat_map(|job| &job.bursts)
            .filter(|burst| burst.kind == BurstKind::Cpu)
            .map(|burst| burst.duration)
            .sum()
    }

    pub fn processes(&self) -> Vec<Process> {
        self.jobs
            .iter()
            .enumerate()
            .map(|(index, job)| Process::new(index + 1, job.arrival, job.bursts.iter().copied()))
            .collect()
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<Job, WorkloadError> {
    let malformed = |reason: String| WorkloadError::Malformed {
        line: line_no,
        reason,
    };

    let mut tokens = line.split_whitespace();
    let arrival = tokens
        .next()
        .ok_or_else(|| malformed("missing arrival time".to_owned()))?;
    let arrival = arrival
        .parse()
        .map_err(|_| malformed(format!("invalid arrival time {arrival:?}")))?;

    let mut bursts = Vec::new();
    while let Some(kind) = tokens.next() {
        let kind = match kind.to_ascii_uppercase().as_str() {
            "CPU" => BurstKind::Cpu,
            "IO" => BurstKind::Io,
            _ => return Err(malformed(format!("unknown burst kind {kind:?}"))),
        };
        let duration = tokens
            .next()
            .ok_or_else(|| malformed(format!("{kind:?} burst without a duration")))?;
        let duration = duration
            .parse()
            .map_err(|_| malformed(format!("invalid duration {duration:?}")))?;
        bursts.push(Burst { kind, duration });
    }

    Ok(Job { arrival, bursts })
}

/// Parses process-file text: one process per line, an arrival time followed
/// by `CPU <n>` / `IO <n>` pairs.
impl FromStr for Workload {
    type Err = WorkloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let jobs = s
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| parse_line(index + 1, line))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_process_files() {
        let workload: Workload = "0 CPU 4 IO 3 CPU 2\n\n3 cpu 5 io 1\n".parse().unwrap();
        assert_eq!(
            workload.jobs(),
            &[
                Job::new(0, [Burst::cpu(4), Burst::io(3), Burst::cpu(2)]),
                Job::new(3, [Burst::cpu(5), Burst::io(1)]),
            ]
        );
        assert_eq!(workload.total_cpu(), 11);

        let processes = workload.processes();
        assert_eq!(processes[1].id, 2);
        assert_eq!(processes[1].arrival, 3);
        assert_eq!(processes[1].time_stamp, 3);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(matches!(
            "0 CPU".parse::<Workload>(),
            Err(WorkloadError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            "0 CPU 2\nx CPU 2".parse::<Workload>(),
            Err(WorkloadError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            "0 DISK 2".parse::<Workload>(),
            Err(WorkloadError::Malformed { line: 1, .. })
        ));
        assert_eq!(
            "0 CPU 1\n4".parse::<Workload>(),
            Err(WorkloadError::EmptyBursts { process: 2 })
        );
    }

    #[test]
    fn bursts_must_alternate_from_cpu() {
        assert_eq!(
            Workload::new(vec![Job::new(0, [Burst::io(1), Burst::cpu(1)])]),
            Err(WorkloadError::MustStartWithCpu { process: 1 })
        );
        assert_eq!(
            Workload::new(vec![Job::new(0, [Burst::cpu(1), Burst::io(1), Burst::io(2)])]),
            Err(WorkloadError::NonAlternating {
                process: 1,
                index: 2
            })
        );
    }
}
