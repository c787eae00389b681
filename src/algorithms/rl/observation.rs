//! State encoding.
//!
//! Maps a pair of combatant snapshots to the compact [`StateKey`] used to
//! index the action-value table.

use super::types::{StateFeatures, StateKey};
use crate::combatant::Combatant;
use crate::error::DecisionError;

/// Health tier: [0,25) -> 0, [25,50) -> 1, [50,inf) -> 2.
///
/// Negative health falls in the lowest tier.
pub fn health_bucket(health: i32) -> u16 {
    if health < 25 {
        0
    } else if health < 50 {
        1
    } else {
        2
    }
}

/// Armor tier: [0,5) -> 0, [5,10) -> 1, [10,inf) -> 2.
pub fn armor_bucket(armor: i32) -> u16 {
    if armor < 5 {
        0
    } else if armor < 10 {
        1
    } else {
        2
    }
}

/// Builds state keys from combatant snapshots.
pub struct StateEncoder;

impl StateEncoder {
    /// Encodes the state seen by `own` when facing `opponent`.
    ///
    /// Pure and deterministic. Fails with [`DecisionError::UnknownClass`] if
    /// either class name is not part of the closed class enumeration.
    pub fn encode(own: &Combatant, opponent: &Combatant) -> Result<StateKey, DecisionError> {
        let features = StateFeatures {
            opponent_class: opponent.class()?.code(),
            opponent_health: health_bucket(opponent.health),
            opponent_armor: armor_bucket(opponent.armor),
            own_class: own.class()?.code(),
            own_health: health_bucket(own.health),
            own_armor: armor_bucket(own.armor),
        };
        Ok(StateKey::pack(features))
    }
}
