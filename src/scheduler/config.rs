use std::fmt;
use std::str::FromStr;

use super::Predictor;
use crate::core::Ticks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Fcfs,
    Vrr,
    Srt,
    Hrrn,
    // Accepted but never simulated
    Feedback,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fcfs => "FCFS",
            Self::Vrr => "VRR",
            Self::Srt => "SRT",
            Self::Hrrn => "HRRN",
            Self::Feedback => "FB",
        })
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fcfs" => Ok(Self::Fcfs),
            "vrr" => Ok(Self::Vrr),
            "srt" => Ok(Self::Srt),
            "hrrn" => Ok(Self::Hrrn),
            "fb" => Ok(Self::Feedback),
            _ => Err(ConfigError::UnknownAlgorithm(s.trim().to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownAlgorithm(String),
    MissingKey(&'static str),
    InvalidValue { key: String, value: String },
    QuantumNotPositive,
    AlphaOutOfRange(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm(name) => write!(f, "unknown scheduling algorithm {name:?}"),
            Self::MissingKey(key) => write!(f, "missing required setting {key:?}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value {value:?} for {key:?}"),
            Self::QuantumNotPositive => write!(f, "quantum must be a positive integer"),
            Self::AlphaOutOfRange(alpha) => write!(f, "alpha must lie in (0, 1), got {alpha}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Which algorithm to simulate plus the parameters it needs: `quantum` for
/// VRR, `alpha` and `service_given` for SRT and HRRN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmConfig {
    pub algorithm: Algorithm,
    pub quantum: Option<Ticks>,
    pub alpha: Option<f64>,
    pub service_given: Option<bool>,
}

impl AlgorithmConfig {
    fn bare(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            quantum: None,
            alpha: None,
            service_given: None,
        }
    }

    pub fn fcfs() -> Self {
        Self::bare(Algorithm::Fcfs)
    }

    pub fn vrr(quantum: Ticks) -> Self {
        Self {
            quantum: Some(quantum),
            ..Self::bare(Algorithm::Vrr)
        }
    }

    pub fn srt(alpha: f64, service_given: bool) -> Self {
        Self {
            alpha: Some(alpha),
            service_given: Some(service_given),
            ..Self::bare(Algorithm::Srt)
        }
    }

    pub fn hrrn(alpha: f64, service_given: bool) -> Self {
        Self {
            alpha: Some(alpha),
            service_given: Some(service_given),
            ..Self::bare(Algorithm::Hrrn)
        }
    }

    pub fn feedback() -> Self {
        Self::bare(Algorithm::Feedback)
    }

    pub fn quantum(&self) -> Result<Ticks, ConfigError> {
        match self.quantum {
            None => Err(ConfigError::MissingKey("quantum")),
            Some(0) => Err(ConfigError::QuantumNotPositive),
            Some(quantum) => Ok(quantum),
        }
    }

    pub fn predictor(&self) -> Result<Predictor, ConfigError> {
        let alpha = self.alpha.ok_or(ConfigError::MissingKey("alpha"))?;
        let service_given = self
            .service_given
            .ok_or(ConfigError::MissingKey("service_give"))?;
        Predictor::new(alpha, service_given)
    }

    /// Rejects a configuration the selected algorithm cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.algorithm {
            Algorithm::Vrr => self.quantum().map(|_| ()),
            Algorithm::Srt | Algorithm::Hrrn => self.predictor().map(|_| ()),
            Algorithm::Fcfs | Algorithm::Feedback => Ok(()),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

/// Parses schedule-file text: one `key=value` setting per line, with keys
/// `name`, `quantum`, `alpha` and `service_give`.
impl FromStr for AlgorithmConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut algorithm = None;
        let mut config = Self::fcfs();

        for line in s.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::InvalidValue {
                    key: line.to_owned(),
                    value: String::new(),
                });
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "name" => algorithm = Some(value.parse::<Algorithm>()?),
                "quantum" => config.quantum = Some(parse_value(key, value)?),
                "alpha" => config.alpha = Some(parse_value(key, value)?),
                "service_give" | "service_given" => {
                    config.service_given =
                        Some(parse_value(key, &value.to_ascii_lowercase())?)
                }
                _ => log::debug!("ignoring unknown schedule setting {key:?}"),
            }
        }

        config.algorithm = algorithm.ok_or(ConfigError::MissingKey("name"))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_schedule_files() {
        let config: AlgorithmConfig = "name=VRR\nquantum=4\n".parse().unwrap();
        assert_eq!(config, AlgorithmConfig::vrr(4));

        let config: AlgorithmConfig = "name=srt\nservice_give=False\nalpha=0.35"
            .parse()
            .unwrap();
        assert_eq!(config, AlgorithmConfig::srt(0.35, false));

        let config: AlgorithmConfig = "name=fb".parse().unwrap();
        assert_eq!(config.algorithm, Algorithm::Feedback);
    }

    #[test]
    fn rejects_incomplete_or_invalid_settings() {
        assert_eq!(
            "name=vrr".parse::<AlgorithmConfig>(),
            Err(ConfigError::MissingKey("quantum"))
        );
        assert_eq!(
            "name=vrr\nquantum=0".parse::<AlgorithmConfig>(),
            Err(ConfigError::QuantumNotPositive)
        );
        assert_eq!(
            "name=hrrn\nalpha=1\nservice_give=true".parse::<AlgorithmConfig>(),
            Err(ConfigError::AlphaOutOfRange(1.0))
        );
        assert_eq!(
            "name=hrrn\nalpha=0.5".parse::<AlgorithmConfig>(),
            Err(ConfigError::MissingKey("service_give"))
        );
        assert_eq!(
            "name=lottery".parse::<AlgorithmConfig>(),
            Err(ConfigError::UnknownAlgorithm("lottery".to_owned()))
        );
        assert_eq!(
            "quantum=3".parse::<AlgorithmConfig>(),
            Err(ConfigError::MissingKey("name"))
        );
        assert!(matches!(
            "name=vrr\nquantum=-2".parse::<AlgorithmConfig>(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn builders_validate() {
        assert!(AlgorithmConfig::fcfs().validate().is_ok());
        assert!(AlgorithmConfig::feedback().validate().is_ok());
        assert!(AlgorithmConfig::srt(0.5, true).validate().is_ok());
        assert_eq!(
            AlgorithmConfig::srt(0.0, true).validate(),
            Err(ConfigError::AlphaOutOfRange(0.0))
        );
    }
}
