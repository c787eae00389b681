//! duelist - action-decision engine for turn-based duels
//!
//! Chooses a non-player combatant's move each round with one of three
//! interchangeable strategies: uniform random, a closed-form expected-value
//! heuristic, or a tabular Q-learning agent whose table is shared across
//! concurrent matches and persisted between runs.

pub mod algorithms;
pub mod combatant;
pub mod engine;
pub mod error;

pub use algorithms::rl::{Action, ConfigError, EngineConfig, ReinforcementAgent, StateKey, Strategy};
pub use combatant::{CombatClass, Combatant};
pub use engine::DecisionEngine;
pub use error::DecisionError;
