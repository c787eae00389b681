//! Decision strategies and the reinforcement-learning machinery behind them.
//!
//! The random and heuristic policies are stateless. The reinforcement agent
//! owns a shared action-value table that is lazily loaded, updated from
//! observed transitions and periodically saved. The self-play [`Trainer`] is
//! behind the `training` feature flag (which brings in `rayon`).

pub mod agent;
pub mod config;
pub mod exploration;
pub mod observation;
pub mod policy;
pub mod q_table;
pub mod reward;
pub mod types;

#[cfg(feature = "training")]
pub mod training;

pub use agent::{AgentStats, ReinforcementAgent, TableSource};
pub use config::{ConfigError, EngineConfig, Strategy};
pub use exploration::ExplorationSchedule;
pub use observation::StateEncoder;
pub use policy::{HeuristicPolicy, Policy, RandomPolicy};
pub use q_table::ActionValueTable;
pub use reward::RewardComputer;
pub use types::{Action, ActionValues, StateFeatures, StateKey, ACTION_COUNT, STATE_COUNT};

#[cfg(feature = "training")]
pub use training::{
    CombatResolver, MatchOutcome, MatchResult, Trainer, TrainingConfig, TrainingError,
    TrainingReport,
};
