//! Core types for the decision engine.
//!
//! Defines the six-move action set and the 16-bit discretized state key
//! shared by the encoder, the action-value table and the reward function.

use std::fmt;

/// Number of actions; also the length of every action-value vector.
pub const ACTION_COUNT: usize = 6;

/// Number of reachable state keys (3^6).
pub const STATE_COUNT: usize = 729;

/// One learned value per action, indexed by [`Action::index`].
pub type ActionValues = [f64; ACTION_COUNT];

/// A move available to a combatant each round.
///
/// Order is significant: it fixes tie-breaking and the layout of
/// [`ActionValues`]. The first three are attacks, the last three defenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Heavy,
    Quick,
    Standard,
    Block,
    Parry,
    Evade,
}

impl Action {
    /// Returns all actions in index order.
    pub fn all() -> [Action; ACTION_COUNT] {
        [
            Action::Heavy,
            Action::Quick,
            Action::Standard,
            Action::Block,
            Action::Parry,
            Action::Evade,
        ]
    }

    /// Returns the index of this action (0=Heavy .. 5=Evade).
    pub fn index(&self) -> usize {
        match self {
            Action::Heavy => 0,
            Action::Quick => 1,
            Action::Standard => 2,
            Action::Block => 3,
            Action::Parry => 4,
            Action::Evade => 5,
        }
    }

    /// Inverse of [`Action::index`].
    pub fn from_index(index: usize) -> Option<Action> {
        Action::all().get(index).copied()
    }

    /// True for Heavy, Quick and Standard.
    pub fn is_offensive(&self) -> bool {
        self.index() < 3
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Heavy => write!(f, "heavy"),
            Action::Quick => write!(f, "quick"),
            Action::Standard => write!(f, "standard"),
            Action::Block => write!(f, "block"),
            Action::Parry => write!(f, "parry"),
            Action::Evade => write!(f, "evade"),
        }
    }
}

/// The six ternary features summarized by a [`StateKey`].
///
/// Every field holds a value in `0..=2`: a class code or a bucket index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateFeatures {
    pub opponent_class: u16,
    pub opponent_health: u16,
    pub opponent_armor: u16,
    pub own_class: u16,
    pub own_health: u16,
    pub own_armor: u16,
}

/// Discretized state packed into 16 bits.
///
/// Layout, two bits per field, most significant first:
/// ```text
/// bits 10-11  opponent class
/// bits  8-9   opponent health bucket
/// bits  6-7   opponent armor bucket
/// bits  4-5   own class
/// bits  2-3   own health bucket
/// bits  0-1   own armor bucket
/// ```
/// Each field only takes the values 0..=2, so 729 of the 4096 addressable
/// keys are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey(u16);

impl StateKey {
    const OPPONENT_CLASS_SHIFT: u16 = 10;
    const OPPONENT_HEALTH_SHIFT: u16 = 8;
    const OPPONENT_ARMOR_SHIFT: u16 = 6;
    const OWN_CLASS_SHIFT: u16 = 4;
    const OWN_HEALTH_SHIFT: u16 = 2;
    const OWN_ARMOR_SHIFT: u16 = 0;
    const FIELD_MASK: u16 = 0b11;
    const USED_BITS: u16 = 0x0FFF;

    /// Packs six features into a key.
    ///
    /// Returns `None` if any feature is outside `0..=2`.
    pub fn from_features(f: StateFeatures) -> Option<StateKey> {
        let values = [
            f.opponent_class,
            f.opponent_health,
            f.opponent_armor,
            f.own_class,
            f.own_health,
            f.own_armor,
        ];
        if values.iter().any(|v| *v > 2) {
            return None;
        }
        Some(Self::pack(f))
    }

    /// Packs features already known to be in `0..=2`.
    pub(super) fn pack(f: StateFeatures) -> StateKey {
        let m = Self::FIELD_MASK;
        StateKey(
            (f.opponent_class & m) << Self::OPPONENT_CLASS_SHIFT
                | (f.opponent_health & m) << Self::OPPONENT_HEALTH_SHIFT
                | (f.opponent_armor & m) << Self::OPPONENT_ARMOR_SHIFT
                | (f.own_class & m) << Self::OWN_CLASS_SHIFT
                | (f.own_health & m) << Self::OWN_HEALTH_SHIFT
                | (f.own_armor & m) << Self::OWN_ARMOR_SHIFT,
        )
    }

    /// Wraps a raw key, rejecting unreachable ones.
    pub fn from_raw(raw: u16) -> Option<StateKey> {
        if Self::is_reachable(raw) {
            Some(StateKey(raw))
        } else {
            None
        }
    }

    /// True if every field of `raw` is in `0..=2` and no bit above 11 is set.
    pub fn is_reachable(raw: u16) -> bool {
        if raw & !Self::USED_BITS != 0 {
            return false;
        }
        (0..6).all(|i| (raw >> (i * 2)) & Self::FIELD_MASK != 3)
    }

    /// Iterates all 729 reachable keys in ascending order.
    pub fn all() -> impl Iterator<Item = StateKey> {
        (0..=Self::USED_BITS)
            .filter(|raw| Self::is_reachable(*raw))
            .map(StateKey)
    }

    /// The packed 16-bit value.
    pub fn raw(&self) -> u16 {
        self.0
    }

    fn field(&self, shift: u16) -> u16 {
        (self.0 >> shift) & Self::FIELD_MASK
    }

    pub fn opponent_class(&self) -> u16 {
        self.field(Self::OPPONENT_CLASS_SHIFT)
    }

    pub fn opponent_health(&self) -> u16 {
        self.field(Self::OPPONENT_HEALTH_SHIFT)
    }

    pub fn opponent_armor(&self) -> u16 {
        self.field(Self::OPPONENT_ARMOR_SHIFT)
    }

    pub fn own_class(&self) -> u16 {
        self.field(Self::OWN_CLASS_SHIFT)
    }

    pub fn own_health(&self) -> u16 {
        self.field(Self::OWN_HEALTH_SHIFT)
    }

    pub fn own_armor(&self) -> u16 {
        self.field(Self::OWN_ARMOR_SHIFT)
    }

    /// Unpacks the key into its six features.
    pub fn features(&self) -> StateFeatures {
        StateFeatures {
            opponent_class: self.opponent_class(),
            opponent_health: self.opponent_health(),
            opponent_armor: self.opponent_armor(),
            own_class: self.own_class(),
            own_health: self.own_health(),
            own_armor: self.own_armor(),
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_indices_round_trip() {
        for (i, action) in Action::all().iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(ACTION_COUNT), None);
    }

    #[test]
    fn offensive_split() {
        let offensive: Vec<_> = Action::all().into_iter().filter(Action::is_offensive).collect();
        assert_eq!(offensive, vec![Action::Heavy, Action::Quick, Action::Standard]);
    }

    #[test]
    fn reachable_key_count() {
        assert_eq!(StateKey::all().count(), STATE_COUNT);
    }

    #[test]
    fn features_round_trip() {
        for key in StateKey::all() {
            assert_eq!(StateKey::from_features(key.features()), Some(key));
        }
    }

    #[test]
    fn out_of_range_feature_rejected() {
        let f = StateFeatures {
            opponent_class: 3,
            opponent_health: 0,
            opponent_armor: 0,
            own_class: 0,
            own_health: 0,
            own_armor: 0,
        };
        assert_eq!(StateKey::from_features(f), None);
    }

    #[test]
    fn unreachable_raw_keys_rejected() {
        assert!(StateKey::from_raw(676).is_some());
        assert!(StateKey::from_raw(0b11).is_none());
        assert!(StateKey::from_raw(0x1000).is_none());
    }

    #[test]
    fn field_accessors() {
        let key = StateKey::from_raw(676).unwrap();
        assert_eq!(key.opponent_class(), 0);
        assert_eq!(key.opponent_health(), 2);
        assert_eq!(key.opponent_armor(), 2);
        assert_eq!(key.own_class(), 2);
        assert_eq!(key.own_health(), 1);
        assert_eq!(key.own_armor(), 0);
    }
}
