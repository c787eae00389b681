//! Read-only combatant snapshots.
//!
//! A [`Combatant`] is the caller's view of one fighter at the moment a
//! decision is requested. The engine only ever borrows it.

pub mod class;

pub use class::CombatClass;

use crate::error::DecisionError;

/// Nominal health ceiling.
pub const MAX_HEALTH: i32 = 100;

/// Nominal armor ceiling.
pub const MAX_ARMOR: i32 = 20;

/// Snapshot of one fighter's class and current stats.
///
/// The class is carried by name, exactly as the caller's character record
/// stores it; it is resolved against [`CombatClass`] when the snapshot is
/// encoded, so unsupported classes surface as [`DecisionError::UnknownClass`].
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    /// Class name ("Knight", "Archer", "Wizard").
    pub class_name: String,
    /// Current health, nominally 0..=100.
    pub health: i32,
    /// Current armor, nominally 0..=20.
    pub armor: i32,
    /// Strength in [0, 1].
    pub strength: f64,
    /// Dexterity in [0, 1].
    pub dexterity: f64,
    /// Intellect in [0, 1].
    pub intellect: f64,
}

impl Combatant {
    /// Creates a snapshot for a known class.
    pub fn new(
        class: CombatClass,
        health: i32,
        armor: i32,
        strength: f64,
        dexterity: f64,
        intellect: f64,
    ) -> Self {
        Self {
            class_name: class.name().to_string(),
            health,
            armor,
            strength,
            dexterity,
            intellect,
        }
    }

    /// Resolves the class name against the closed enumeration.
    pub fn class(&self) -> Result<CombatClass, DecisionError> {
        self.class_name.parse()
    }

    /// Returns true once health has been exhausted.
    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_canonical_name() {
        let c = Combatant::new(CombatClass::Archer, 90, 4, 0.3, 0.8, 0.6);
        assert_eq!(c.class_name, "Archer");
        assert_eq!(c.class().unwrap(), CombatClass::Archer);
    }

    #[test]
    fn unknown_class_is_reported() {
        let mut c = Combatant::new(CombatClass::Knight, 90, 4, 0.8, 0.6, 0.3);
        c.class_name = "Necromancer".into();
        assert!(matches!(c.class(), Err(DecisionError::UnknownClass(_))));
    }

    #[test]
    fn defeated_at_zero_health() {
        let mut c = Combatant::new(CombatClass::Wizard, 1, 0, 0.5, 0.3, 0.9);
        assert!(!c.is_defeated());
        c.health = 0;
        assert!(c.is_defeated());
    }
}
