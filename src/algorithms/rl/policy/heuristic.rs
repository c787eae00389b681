//! Expected-value heuristic policy.
//!
//! Scores every action along three dimensions (damage dealt, own health
//! change, own armor change) using the closed-form success probabilities and
//! magnitudes of each move, then turns the scores into a sampling
//! distribution. Looks one round ahead only.

use rand::{Rng, RngCore};

use super::trait_::Policy;
use crate::algorithms::rl::types::{Action, ActionValues, ACTION_COUNT};
use crate::combatant::Combatant;
use crate::error::DecisionError;

/// Number of scored dimensions per action.
const DIMENSIONS: usize = 3;

/// Per-dimension expected outcome of each action, indexed by [`Action::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedOutcomes {
    /// Expected damage inflicted on the opponent.
    pub damage: ActionValues,
    /// Expected change in own health.
    pub health: ActionValues,
    /// Expected change in own armor.
    pub armor: ActionValues,
}

/// Integer magnitude of a move driven by `stat`, as the combat rules round it.
fn magnitude(stat: f64, bias: f64) -> f64 {
    (10.0 * stat + bias).trunc()
}

impl ExpectedOutcomes {
    /// Evaluates all three dimensions for `own` facing `opponent`.
    pub fn evaluate(own: &Combatant, opponent: &Combatant) -> Self {
        let incoming = mean(&Self::damage(opponent, own));
        Self {
            damage: Self::damage(own, opponent),
            health: Self::health(own, incoming),
            armor: Self::armor(own, incoming),
        }
    }

    /// Expected damage `attacker` deals to `defender` with each action.
    ///
    /// Attacks land with probability `1 - defender's countering stat`; a
    /// parry's counter lands with the attacker's own dexterity.
    fn damage(attacker: &Combatant, defender: &Combatant) -> ActionValues {
        [
            (1.0 - defender.intellect) * magnitude(attacker.strength, 1.5),
            (1.0 - defender.strength) * magnitude(attacker.dexterity, 1.5),
            (1.0 - defender.dexterity) * magnitude(attacker.intellect, 1.5),
            0.0,
            attacker.dexterity * magnitude(attacker.dexterity, 0.5),
            0.0,
        ]
    }

    /// Expected own health change given the opponent's mean expected damage.
    fn health(own: &Combatant, incoming: f64) -> ActionValues {
        let failed_parry = (1.0 - own.dexterity) * magnitude(own.dexterity, 0.5);
        [
            -incoming,
            -incoming,
            -incoming,
            (1.0 - own.strength) * incoming,
            -(failed_parry + incoming),
            own.intellect * magnitude(own.intellect, 0.5) - (1.0 - own.intellect) * incoming,
        ]
    }

    /// Expected own armor change given the opponent's mean expected damage.
    fn armor(own: &Combatant, incoming: f64) -> ActionValues {
        let failed_parry = (1.0 - own.dexterity) * magnitude(own.dexterity, 0.5);
        [
            -incoming,
            -incoming,
            -incoming,
            own.strength * magnitude(own.strength, 0.5) - (1.0 - own.strength) * incoming,
            -(failed_parry + incoming),
            -(1.0 - own.intellect) * incoming,
        ]
    }

    /// The 18 scores, dimension-major (damage, health, armor).
    fn flatten(&self) -> [f64; DIMENSIONS * ACTION_COUNT] {
        let mut out = [0.0; DIMENSIONS * ACTION_COUNT];
        for (d, dim) in [self.damage, self.health, self.armor].iter().enumerate() {
            out[d * ACTION_COUNT..(d + 1) * ACTION_COUNT].copy_from_slice(dim);
        }
        out
    }
}

fn mean(values: &ActionValues) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Maps `n` from `[min, max]` onto `[0, 1]`.
fn normalize(n: f64, min: f64, max: f64) -> f64 {
    (n - min) / (max - min)
}

/// Non-learning one-ply expected-value policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    /// Creates a new heuristic policy.
    pub fn new() -> Self {
        Self
    }

    /// Probability of choosing each action; entries are non-negative and sum
    /// to 1.
    ///
    /// All 18 dimension scores are min-max normalized together, rescaled to
    /// sum to 1, then each action's three contributions are added up. If
    /// every score is equal the distribution is uniform.
    pub fn distribution(own: &Combatant, opponent: &Combatant) -> ActionValues {
        Self::from_scores(&ExpectedOutcomes::evaluate(own, opponent).flatten())
    }

    fn from_scores(scores: &[f64; DIMENSIONS * ACTION_COUNT]) -> ActionValues {
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut weights = [1.0 / scores.len() as f64; DIMENSIONS * ACTION_COUNT];
        if max > min {
            for (w, s) in weights.iter_mut().zip(scores) {
                *w = normalize(*s, min, max);
            }
            let sum: f64 = weights.iter().sum();
            for w in weights.iter_mut() {
                *w = normalize(*w, 0.0, sum);
            }
        }

        let mut folded = [0.0; ACTION_COUNT];
        for (i, w) in weights.iter().enumerate() {
            folded[i % ACTION_COUNT] += w;
        }
        folded
    }

    /// Picks the action at which the running remainder `u - Σ weights` first
    /// reaches zero.
    ///
    /// If rounding leaves a positive remainder after all weights, the last
    /// action with positive weight is chosen.
    pub fn sample(weights: &ActionValues, u: f64) -> Action {
        let mut remainder = u;
        let mut fallback = Action::Evade;
        for action in Action::all() {
            let w = weights[action.index()];
            if w > 0.0 {
                fallback = action;
            }
            remainder -= w;
            if remainder <= 0.0 {
                return action;
            }
        }
        fallback
    }
}

impl Policy for HeuristicPolicy {
    fn select_action(
        &self,
        own: &Combatant,
        opponent: &Combatant,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DecisionError> {
        let weights = Self::distribution(own, opponent);
        let u: f64 = rng.gen();
        Ok(Self::sample(&weights, u))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
