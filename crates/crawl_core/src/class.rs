//! Character class archetypes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::math::Fixed;
use crate::stats::{DerivedStats, StatKind};

/// Playable archetype, chosen once before a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ClassKind {
    /// Warrior: short reach, heals on hit.
    #[default]
    Melee,
    /// Ranger: fires bolts, heals on kill.
    Ranged,
    /// Mage: spends mana on every attack.
    Caster,
}

/// Immutable archetype data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSpec {
    /// Display name.
    pub name: &'static str,
    /// Basic attack reach from the player's center, in world units.
    pub attack_range: i32,
    /// Share of basic and physical skill damage returned as health, in percent.
    pub lifesteal_percent: u32,
    /// Mana spent per basic attack.
    pub mana_cost: u32,
    /// Health restored on every kill.
    pub kill_heal: u32,
    /// Attribute the class scales with.
    pub primary_stat: StatKind,
}

const WARRIOR: ClassSpec = ClassSpec {
    name: "Warrior",
    attack_range: 50,
    lifesteal_percent: 20,
    mana_cost: 0,
    kill_heal: 0,
    primary_stat: StatKind::Strength,
};

const RANGER: ClassSpec = ClassSpec {
    name: "Ranger",
    attack_range: 200,
    lifesteal_percent: 0,
    mana_cost: 0,
    kill_heal: 20,
    primary_stat: StatKind::Dexterity,
};

const MAGE: ClassSpec = ClassSpec {
    name: "Mage",
    attack_range: 150,
    lifesteal_percent: 0,
    mana_cost: 10,
    kill_heal: 0,
    primary_stat: StatKind::Intelligence,
};

impl ClassKind {
    /// All classes in menu order.
    pub const ALL: [Self; 3] = [Self::Melee, Self::Ranged, Self::Caster];

    /// Archetype data for this class.
    #[must_use]
    pub const fn spec(self) -> &'static ClassSpec {
        match self {
            Self::Melee => &WARRIOR,
            Self::Ranged => &RANGER,
            Self::Caster => &MAGE,
        }
    }

    /// Basic attack reach as a fixed-point distance.
    #[must_use]
    pub fn attack_range(self) -> Fixed {
        Fixed::from_num(self.spec().attack_range)
    }

    /// Basic attack damage for the current derived stats.
    ///
    /// Melee and Ranged build on a base of 10, Caster on 15.
    #[must_use]
    pub const fn attack_damage(self, derived: &DerivedStats) -> u32 {
        match self {
            Self::Melee => derived.physical_damage(10),
            Self::Ranged => derived.ranged_damage(10),
            Self::Caster => derived.magical_damage(15),
        }
    }

    /// Lifesteal heal for a hit of `damage`, floored.
    #[must_use]
    pub const fn lifesteal_heal(self, damage: u32) -> u32 {
        damage * self.spec().lifesteal_percent / 100
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

impl FromStr for ClassKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "melee" | "warrior" => Ok(Self::Melee),
            "ranged" | "ranger" => Ok(Self::Ranged),
            "caster" | "mage" => Ok(Self::Caster),
            _ => Err(GameError::UnknownClass(s.to_string())),
        }
    }
}
