//! The closed set of combatant classes and their stat archetypes.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use super::Combatant;
use crate::error::DecisionError;

/// Combatant class.
///
/// The enumeration is closed: every variant has a distinct two-bit code used
/// by the state key, and names outside it are rejected rather than mapped to a
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatClass {
    Knight,
    Archer,
    Wizard,
}

impl CombatClass {
    /// Returns all classes in code order.
    pub fn all() -> [CombatClass; 3] {
        [CombatClass::Knight, CombatClass::Archer, CombatClass::Wizard]
    }

    /// Two-bit code stored in the state key (0=Knight, 1=Archer, 2=Wizard).
    pub fn code(&self) -> u16 {
        match self {
            CombatClass::Knight => 0,
            CombatClass::Archer => 1,
            CombatClass::Wizard => 2,
        }
    }

    /// Inverse of [`CombatClass::code`].
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(CombatClass::Knight),
            1 => Some(CombatClass::Archer),
            2 => Some(CombatClass::Wizard),
            _ => None,
        }
    }

    /// Canonical class name as it appears in character records.
    pub fn name(&self) -> &'static str {
        match self {
            CombatClass::Knight => "Knight",
            CombatClass::Archer => "Archer",
            CombatClass::Wizard => "Wizard",
        }
    }

    /// Base values (out of 20) for strength, dexterity and intellect.
    ///
    /// Each rolled score is `(base + 0..=5) / 20`.
    fn ability_bases(&self) -> [u32; 3] {
        match self {
            CombatClass::Knight => [15, 10, 5],
            CombatClass::Archer => [5, 15, 10],
            CombatClass::Wizard => [10, 5, 15],
        }
    }

    /// Rolls a fresh combatant of this class.
    ///
    /// Health is drawn from 80..=100, armor from 0..=20, and each ability
    /// score from the class archetype.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Combatant {
        let [str_base, dex_base, int_base] = self.ability_bases();
        let mut roll = |base: u32| f64::from(base + rng.gen_range(0..=5)) / 20.0;
        let strength = roll(str_base);
        let dexterity = roll(dex_base);
        let intellect = roll(int_base);
        Combatant {
            class_name: self.name().to_string(),
            health: rng.gen_range(80..=super::MAX_HEALTH),
            armor: rng.gen_range(0..=super::MAX_ARMOR),
            strength,
            dexterity,
            intellect,
        }
    }
}

impl FromStr for CombatClass {
    type Err = DecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Knight" => Ok(CombatClass::Knight),
            "Archer" => Ok(CombatClass::Archer),
            "Wizard" => Ok(CombatClass::Wizard),
            other => Err(DecisionError::UnknownClass(other.to_string())),
        }
    }
}

impl fmt::Display for CombatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
