//! Reward signal for the reinforcement agent.
//!
//! The reward is read entirely off the bucket fields of two consecutive state
//! keys; raw snapshots are never re-inspected.

use super::types::StateKey;

/// Reward for each bucket the opponent loses (health or armor).
pub const OPPONENT_LOSS_REWARD: f64 = 1.5;

/// Reward for each bucket the own combatant gains (health or armor).
pub const OWN_GAIN_REWARD: f64 = 1.0;

/// Penalty for each bucket the own combatant loses (health or armor).
pub const OWN_LOSS_PENALTY: f64 = -0.5;

/// Computes rewards for state transitions.
pub struct RewardComputer;

impl RewardComputer {
    /// Computes the total reward for moving from `prior` to `next`.
    ///
    /// # Components
    ///
    /// 1. **Opponent health**: `+1.5` if its bucket dropped.
    /// 2. **Opponent armor**: `+1.5` if its bucket dropped.
    /// 3. **Own health**: `+1` if its bucket rose, `-0.5` if it dropped.
    /// 4. **Own armor**: `+1` if its bucket rose, `-0.5` if it dropped.
    pub fn compute(prior: StateKey, next: StateKey) -> f64 {
        Self::opponent_loss(prior.opponent_health(), next.opponent_health())
            + Self::opponent_loss(prior.opponent_armor(), next.opponent_armor())
            + Self::own_change(prior.own_health(), next.own_health())
            + Self::own_change(prior.own_armor(), next.own_armor())
    }

    fn opponent_loss(before: u16, after: u16) -> f64 {
        if after < before {
            OPPONENT_LOSS_REWARD
        } else {
            0.0
        }
    }

    fn own_change(before: u16, after: u16) -> f64 {
        if after > before {
            OWN_GAIN_REWARD
        } else if after < before {
            OWN_LOSS_PENALTY
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::rl::types::StateFeatures;

    fn key(f: StateFeatures) -> StateKey {
        StateKey::from_features(f).unwrap()
    }

    fn base() -> StateFeatures {
        // Knight opponent (health 2, armor 2) against an own Wizard (health 1, armor 0).
        StateFeatures {
            opponent_class: 0,
            opponent_health: 2,
            opponent_armor: 2,
            own_class: 2,
            own_health: 1,
            own_armor: 0,
        }
    }

    #[test]
    fn unchanged_state_has_no_reward() {
        let s = key(base());
        assert_eq!(RewardComputer::compute(s, s), 0.0);
    }

    #[test]
    fn opponent_health_drop_and_own_armor_rise() {
        let prior = key(base());
        let next = key(StateFeatures {
            opponent_health: 1,
            own_armor: 1,
            ..base()
        });
        assert_eq!(prior.raw(), 676);
        assert_eq!(next.raw(), 421);
        assert!((RewardComputer::compute(prior, next) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn own_losses_are_penalized() {
        let prior = key(base());
        let next = key(StateFeatures {
            own_health: 0,
            ..base()
        });
        assert!((RewardComputer::compute(prior, next) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn opponent_gains_are_ignored() {
        let prior = key(StateFeatures {
            opponent_health: 0,
            opponent_armor: 0,
            ..base()
        });
        let next = key(base());
        assert_eq!(RewardComputer::compute(prior, next), 0.0);
    }

    #[test]
    fn maximum_reward() {
        let prior = key(StateFeatures {
            own_health: 0,
            own_armor: 0,
            ..base()
        });
        let next = key(StateFeatures {
            opponent_health: 0,
            opponent_armor: 0,
            own_health: 2,
            own_armor: 2,
            ..base()
        });
        assert!((RewardComputer::compute(prior, next) - 5.0).abs() < 1e-12);
    }
}
