//! Random policy, the baseline strategy.

use rand::{Rng, RngCore};

use super::trait_::Policy;
use crate::algorithms::rl::types::{Action, ACTION_COUNT};
use crate::combatant::Combatant;
use crate::error::DecisionError;

/// Uniformly random action selection.
///
/// Ignores both snapshots. Also used by the reinforcement agent for its
/// explore branch.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPolicy;

impl RandomPolicy {
    /// Creates a new random policy.
    pub fn new() -> Self {
        Self
    }

    /// Draws one action uniformly.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Action {
        Action::all()[rng.gen_range(0..ACTION_COUNT)]
    }
}

impl Policy for RandomPolicy {
    fn select_action(
        &self,
        _own: &Combatant,
        _opponent: &Combatant,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DecisionError> {
        Ok(Self::sample(rng))
    }

    fn name(&self) -> &str {
        "random"
    }
}
