//! Configuration for the decision engine and the reinforcement agent.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Decision strategy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Uniformly random action.
    Random,
    /// Closed-form expected-value heuristic.
    Heuristic,
    /// Tabular Q-learning agent.
    Reinforcement,
}

impl Strategy {
    /// Returns all strategies.
    pub fn all() -> [Strategy; 3] {
        [Strategy::Random, Strategy::Heuristic, Strategy::Reinforcement]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Random => write!(f, "random"),
            Strategy::Heuristic => write!(f, "heuristic"),
            Strategy::Reinforcement => write!(f, "reinforcement"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Strategy::Random),
            "heuristic" => Ok(Strategy::Heuristic),
            "reinforcement" => Ok(Strategy::Reinforcement),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown strategy {0:?}; expected random, heuristic or reinforcement")]
    UnknownStrategy(String),

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("Cannot read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration supplied by the startup layer.
///
/// Every field has a default, so a JSON document only needs the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Which strategy the engine dispatches to.
    pub strategy: Strategy,
    /// Learning rate α of the temporal-difference update.
    pub learning_rate: f64,
    /// Discount factor γ applied to the next state's best value.
    pub discount: f64,
    /// Initial explore rate.
    pub explore_rate: f64,
    /// Whether reported transitions update the table.
    pub training: bool,
    /// Where the action-value table is loaded from and saved to.
    /// `None` keeps the table in memory only.
    pub table_path: Option<PathBuf>,
    /// Save the table every this many decisions after the first (0 = never).
    pub persist_every: u64,
}

impl EngineConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks that α, γ and the explore rate are probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("learning_rate", self.learning_rate),
            ("discount", self.discount),
            ("explore_rate", self.explore_rate),
        ];
        for (field, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Heuristic,
            learning_rate: 0.05,
            discount: 0.3,
            explore_rate: 1.0,
            training: false,
            table_path: None,
            persist_every: 1,
        }
    }
}
