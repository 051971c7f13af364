use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::blockchain::DEFAULT_DIFFICULTY;
use crate::worker::StoppingPolicy;

pub const DEFAULT_ROUNDS: usize = 2;
pub const DEFAULT_TARGET_BLOCKS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    NotANumber { name: String, value: String },
    #[error("{name} must be greater than zero")]
    Zero { name: String },
    #[error("MINER_POLICY must be `rounds` or `quota`, got {0:?}")]
    UnknownPolicy(String),
    #[error("MINER_OUTPUT must be `text` or `json`, got {0:?}")]
    UnknownOutput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Startup parameters for a mining run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workers: usize,
    pub difficulty: u32,
    pub policy: StoppingPolicy,
    pub output: OutputFormat,
}

impl Config {
    /// Read `.env`, the process environment, and the first positional argument
    /// (worker count override).
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let workers_arg = env::args().nth(1);
        Self::from_lookup(|key| env::var(key).ok(), workers_arg)
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, workers_arg: Option<String>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let workers = match workers_arg {
            Some(raw) => parse_positive("workers", &raw)?,
            None => match lookup("MINER_WORKERS") {
                Some(raw) => parse_positive("MINER_WORKERS", &raw)?,
                None => num_cpus::get(),
            },
        };

        let difficulty = match lookup("MINER_DIFFICULTY") {
            Some(raw) => parse_number("MINER_DIFFICULTY", &raw)?,
            None => DEFAULT_DIFFICULTY,
        };

        let policy = match lookup("MINER_POLICY").as_deref().map(str::trim) {
            None | Some("rounds") => StoppingPolicy::FixedRounds {
                rounds: match lookup("MINER_ROUNDS") {
                    Some(raw) => parse_positive("MINER_ROUNDS", &raw)?,
                    None => DEFAULT_ROUNDS,
                },
            },
            Some("quota") => StoppingPolicy::SharedQuota {
                target: match lookup("MINER_TARGET_BLOCKS") {
                    Some(raw) => parse_positive("MINER_TARGET_BLOCKS", &raw)?,
                    None => DEFAULT_TARGET_BLOCKS,
                },
            },
            Some(other) => return Err(ConfigError::UnknownPolicy(other.to_string())),
        };

        let output = match lookup("MINER_OUTPUT").as_deref().map(str::trim) {
            None | Some("text") => OutputFormat::Text,
            Some("json") => OutputFormat::Json,
            Some(other) => return Err(ConfigError::UnknownOutput(other.to_string())),
        };

        Ok(Self {
            workers,
            difficulty,
            policy,
            output,
        })
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::NotANumber {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

fn parse_positive(name: &str, raw: &str) -> Result<usize, ConfigError> {
    match parse_number(name, raw)? {
        0 => Err(ConfigError::Zero {
            name: name.to_string(),
        }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], arg: Option<&str>) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned(), arg.map(String::from))
    }

    #[test]
    fn defaults_to_two_rounds_at_difficulty_one() {
        let cfg = load(&[], None).unwrap();
        assert_eq!(cfg.workers, num_cpus::get());
        assert_eq!(cfg.difficulty, 1);
        assert_eq!(cfg.policy, StoppingPolicy::FixedRounds { rounds: 2 });
        assert_eq!(cfg.output, OutputFormat::Text);
    }

    #[test]
    fn positional_argument_overrides_worker_env() {
        let cfg = load(&[("MINER_WORKERS", "3")], Some("4")).unwrap();
        assert_eq!(cfg.workers, 4);
        let cfg = load(&[("MINER_WORKERS", "3")], None).unwrap();
        assert_eq!(cfg.workers, 3);
    }

    #[test]
    fn quota_policy_reads_target() {
        let cfg = load(
            &[
                ("MINER_POLICY", "quota"),
                ("MINER_TARGET_BLOCKS", "8"),
                ("MINER_DIFFICULTY", "2"),
                ("MINER_OUTPUT", "json"),
            ],
            Some("4"),
        )
        .unwrap();
        assert_eq!(cfg.policy, StoppingPolicy::SharedQuota { target: 8 });
        assert_eq!(cfg.difficulty, 2);
        assert_eq!(cfg.output, OutputFormat::Json);
    }

    #[test]
    fn difficulty_zero_is_allowed() {
        let cfg = load(&[("MINER_DIFFICULTY", "0")], Some("1")).unwrap();
        assert_eq!(cfg.difficulty, 0);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert_eq!(
            load(&[], Some("four")),
            Err(ConfigError::NotANumber {
                name: "workers".into(),
                value: "four".into()
            })
        );
        assert_eq!(
            load(&[], Some("0")),
            Err(ConfigError::Zero {
                name: "workers".into()
            })
        );
        assert!(matches!(
            load(&[("MINER_ROUNDS", "-1")], Some("1")),
            Err(ConfigError::NotANumber { .. })
        ));
        assert_eq!(
            load(&[("MINER_POLICY", "forever")], Some("1")),
            Err(ConfigError::UnknownPolicy("forever".into()))
        );
        assert_eq!(
            load(&[("MINER_OUTPUT", "xml")], Some("1")),
            Err(ConfigError::UnknownOutput("xml".into()))
        );
    }
}
