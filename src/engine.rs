//! Decision engine façade.
//!
//! The single entry point the combat resolver calls: it routes each decision
//! to the configured strategy and, in reinforcement mode, forwards observed
//! transitions to the shared agent.

use std::sync::Arc;

use rand::RngCore;

use crate::algorithms::rl::{
    Action, ConfigError, EngineConfig, HeuristicPolicy, Policy, RandomPolicy, ReinforcementAgent,
    Strategy,
};
use crate::combatant::Combatant;
use crate::error::DecisionError;

/// Dispatches decisions to one of the three strategies.
///
/// Cheap to share behind an [`Arc`]; every method takes `&self`.
#[derive(Debug)]
pub struct DecisionEngine {
    strategy: Strategy,
    random: RandomPolicy,
    heuristic: HeuristicPolicy,
    agent: Arc<ReinforcementAgent>,
}

impl DecisionEngine {
    /// Validates `config` and builds an engine with its own agent.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_agent(
            config.strategy,
            Arc::new(ReinforcementAgent::new(config)),
        ))
    }

    /// Builds an engine around an existing agent, e.g. one shared with other
    /// engines.
    pub fn with_agent(strategy: Strategy, agent: Arc<ReinforcementAgent>) -> Self {
        Self {
            strategy,
            random: RandomPolicy::new(),
            heuristic: HeuristicPolicy::new(),
            agent,
        }
    }

    /// The configured strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The shared reinforcement agent.
    pub fn agent(&self) -> &Arc<ReinforcementAgent> {
        &self.agent
    }

    /// The policy decisions are routed to.
    pub fn policy(&self) -> &dyn Policy {
        match self.strategy {
            Strategy::Random => &self.random,
            Strategy::Heuristic => &self.heuristic,
            Strategy::Reinforcement => self.agent.as_ref(),
        }
    }

    /// Chooses `own`'s action against `opponent` using the thread-local RNG.
    pub fn decide(&self, own: &Combatant, opponent: &Combatant) -> Result<Action, DecisionError> {
        self.decide_with(own, opponent, &mut rand::thread_rng())
    }

    /// Chooses `own`'s action against `opponent` with an explicit RNG.
    pub fn decide_with(
        &self,
        own: &Combatant,
        opponent: &Combatant,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DecisionError> {
        self.policy().select_action(own, opponent, rng)
    }

    /// Reports the snapshots before and after `action` was resolved.
    ///
    /// Only the reinforcement strategy learns; the others return `Ok(None)`.
    /// Returns the reward applied, or `None` when nothing was learned.
    pub fn observe(
        &self,
        before: (&Combatant, &Combatant),
        action: Action,
        after: (&Combatant, &Combatant),
    ) -> Result<Option<f64>, DecisionError> {
        match self.strategy {
            Strategy::Reinforcement => self.agent.observe(before, action, after),
            Strategy::Random | Strategy::Heuristic => Ok(None),
        }
    }
}
