use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use rand::prelude::*;
use std::{fs, io::Write, path::PathBuf};
use uniproc_sim::{AlgorithmConfig, Burst, Job, Workload, simulate};

/// Single-CPU scheduling simulator
#[derive(Parser, Debug)]
#[command(name = "uniproc_sim")]
#[command(about = "Simulate FCFS, VRR, SRT and HRRN on one CPU", long_about = None)]
struct Args {
    /// Schedule file with `name`, `quantum`, `alpha` and `service_give` settings
    #[arg(requires = "processes")]
    schedule: Option<PathBuf>,

    /// Process file, one `arrival CPU d IO d ...` line per process
    #[arg(requires = "schedule")]
    processes: Option<PathBuf>,

    /// Seed of the random workload used when no files are given
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    let (configs, workload) = match (args.schedule, args.processes) {
        (Some(schedule), Some(processes)) => {
            let config = fs::read_to_string(&schedule)
                .with_context(|| format!("reading schedule file {}", schedule.display()))?
                .parse::<AlgorithmConfig>()
                .with_context(|| format!("parsing schedule file {}", schedule.display()))?;
            let workload = fs::read_to_string(&processes)
                .with_context(|| format!("reading process file {}", processes.display()))?
                .parse::<Workload>()
                .with_context(|| format!("parsing process file {}", processes.display()))?;
            (vec![config], workload)
        }
        _ => {
            let configs = vec![
                AlgorithmConfig::fcfs(),
                AlgorithmConfig::vrr(4),
                AlgorithmConfig::srt(0.5, false),
                AlgorithmConfig::hrrn(0.5, false),
            ];
            (configs, bernoulli_workload(100, 0.2, 3, args.seed)?)
        }
    };

    for config in configs {
        match simulate(&workload, &config)? {
            Some(report) => {
                for entry in &report.trace {
                    println!("{entry}");
                }
                println!("\n{report}\n");
            }
            None => println!(
                "{} is not implemented; no simulation result",
                config.algorithm
            ),
        }
    }

    Ok(())
}

// A process arrives at each tick with probability `p_arrival` and alternates
// up to `max_cpu_bursts` CPU bursts with IO
fn bernoulli_workload(
    ticks: u64,
    p_arrival: f64,
    max_cpu_bursts: usize,
    seed: u64,
) -> Result<Workload> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let cpu_bursts = rng.random_range(1..=max_cpu_bursts);
            let mut bursts = Vec::with_capacity(2 * cpu_bursts - 1);
            for i in 0..cpu_bursts {
                if i > 0 {
                    bursts.push(Burst::io(rng.random_range(1..=6)));
                }
                bursts.push(Burst::cpu(rng.random_range(1..=10)));
            }
            jobs.push(Job::new(t, bursts));
        }
    }

    Ok(Workload::new(jobs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn files_come_as_a_pair() {
        let argv = ["uniproc_sim", "schedule.txt", "processes.txt"];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.schedule, Some(PathBuf::from("schedule.txt")));
        assert_eq!(args.processes, Some(PathBuf::from("processes.txt")));
        assert_eq!(args.seed, 0);

        assert!(Args::try_parse_from(["uniproc_sim", "schedule.txt"]).is_err());
        assert!(Args::try_parse_from(["uniproc_sim", "a", "b", "c"]).is_err());
    }

    #[test]
    fn seed_selects_the_random_workload() {
        let args = Args::try_parse_from(["uniproc_sim", "--seed", "7"]).unwrap();
        assert_eq!(args.schedule, None);
        assert_eq!(args.seed, 7);

        let first = bernoulli_workload(50, 0.3, 3, args.seed).unwrap();
        let second = bernoulli_workload(50, 0.3, 3, args.seed).unwrap();
        assert_eq!(first.jobs(), second.jobs());
    }
}
