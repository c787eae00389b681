//! Policy trait shared by every decision strategy.

use rand::RngCore;

use crate::algorithms::rl::types::Action;
use crate::combatant::Combatant;
use crate::error::DecisionError;

/// A strategy that picks the own combatant's next action.
///
/// Policies are shared across concurrently running matches, so selection
/// takes `&self`; any mutable state must be synchronized internally.
pub trait Policy: Send + Sync {
    /// Selects an action for `own` when facing `opponent`.
    ///
    /// # Arguments
    ///
    /// * `own` - The engine-controlled combatant
    /// * `opponent` - The combatant it is fighting
    /// * `rng` - Source of randomness for sampling and exploration
    fn select_action(
        &self,
        own: &Combatant,
        opponent: &Combatant,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DecisionError>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
