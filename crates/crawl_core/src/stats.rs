//! Attribute points and the combat values derived from them.
//!
//! Derived values are never stored as a source of truth: callers recompute
//! them with [`derive_combat_stats`] whenever points or equipment change.

use serde::{Deserialize, Serialize};

use crate::items::Equipment;
use crate::math::{ratio, Fixed};

/// Points every attribute starts with.
pub const BASE_STAT_VALUE: u32 = 5;
/// Max health before vitality.
pub const BASE_MAX_HEALTH: u32 = 100;
/// Max mana before intelligence.
pub const BASE_MAX_MANA: u32 = 50;
/// Move speed before agility, in units per second.
pub const BASE_MOVE_SPEED: i32 = 200;

/// One of the six attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Physical damage.
    Strength,
    /// Move and attack speed.
    Agility,
    /// Max health.
    Vitality,
    /// Magic damage and max mana.
    Intelligence,
    /// Ranged damage and crit.
    Dexterity,
    /// Crit.
    Luck,
}

impl StatKind {
    /// All attributes in display order.
    pub const ALL: [Self; 6] = [
        Self::Strength,
        Self::Agility,
        Self::Vitality,
        Self::Intelligence,
        Self::Dexterity,
        Self::Luck,
    ];
}

/// Attribute points. Values are unsigned and only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stats {
    /// STR.
    pub strength: u32,
    /// AGI.
    pub agility: u32,
    /// VIT.
    pub vitality: u32,
    /// INT.
    pub intelligence: u32,
    /// DEX.
    pub dexterity: u32,
    /// LUK.
    pub luck: u32,
}

impl Stats {
    /// Fresh character attributes, every stat at [`BASE_STAT_VALUE`].
    #[must_use]
    pub const fn starting() -> Self {
        Self {
            strength: BASE_STAT_VALUE,
            agility: BASE_STAT_VALUE,
            vitality: BASE_STAT_VALUE,
            intelligence: BASE_STAT_VALUE,
            dexterity: BASE_STAT_VALUE,
            luck: BASE_STAT_VALUE,
        }
    }

    /// Build a bonus block from `(stat, amount)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(StatKind, u32)]) -> Self {
        let mut stats = Self::default();
        for &(kind, amount) in pairs {
            stats.add(kind, amount);
        }
        stats
    }

    /// Read one attribute.
    #[must_use]
    pub const fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Strength => self.strength,
            StatKind::Agility => self.agility,
            StatKind::Vitality => self.vitality,
            StatKind::Intelligence => self.intelligence,
            StatKind::Dexterity => self.dexterity,
            StatKind::Luck => self.luck,
        }
    }

    /// Add points to one attribute.
    pub fn add(&mut self, kind: StatKind, amount: u32) {
        let slot = match kind {
            StatKind::Strength => &mut self.strength,
            StatKind::Agility => &mut self.agility,
            StatKind::Vitality => &mut self.vitality,
            StatKind::Intelligence => &mut self.intelligence,
            StatKind::Dexterity => &mut self.dexterity,
            StatKind::Luck => &mut self.luck,
        };
        *slot = slot.saturating_add(amount);
    }

    /// Sum of two stat blocks.
    #[must_use]
    pub fn combined(&self, bonus: &Self) -> Self {
        let mut total = *self;
        for kind in StatKind::ALL {
            total.add(kind, bonus.get(kind));
        }
        total
    }

    /// Whether every attribute is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        StatKind::ALL.iter().all(|&kind| self.get(kind) == 0)
    }
}

/// Combat values computed from allocated points plus equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedStats {
    /// Allocated points with equipment bonuses folded in.
    pub effective: Stats,
    /// `100 + VIT×10`.
    pub max_health: u32,
    /// `50 + INT×5`.
    pub max_mana: u32,
    /// `200 + AGI×5`, units per second.
    #[serde(with = "crate::math::fixed_serde")]
    pub move_speed: Fixed,
    /// `1 + AGI×0.02`.
    #[serde(with = "crate::math::fixed_serde")]
    pub attack_speed: Fixed,
    /// `(DEX+LUK)×0.5`, in percent.
    #[serde(with = "crate::math::fixed_serde")]
    pub crit_chance: Fixed,
}

impl DerivedStats {
    /// Physical damage on top of `base`: `base + STR×2`.
    #[must_use]
    pub const fn physical_damage(&self, base: u32) -> u32 {
        base + self.effective.strength * 2
    }

    /// Magical damage on top of `base`: `base + INT×2`.
    #[must_use]
    pub const fn magical_damage(&self, base: u32) -> u32 {
        base + self.effective.intelligence * 2
    }

    /// Ranged damage on top of `base`: `base + DEX×2`.
    #[must_use]
    pub const fn ranged_damage(&self, base: u32) -> u32 {
        base + self.effective.dexterity * 2
    }
}

/// Derive combat values from allocated points and worn items.
///
/// Equipment bonuses are summed into a working copy; `base` is untouched.
///
/// # Example
///
/// ```
/// use crawl_core::items::Equipment;
/// use crawl_core::stats::{derive_combat_stats, Stats};
///
/// let derived = derive_combat_stats(&Stats::starting(), &Equipment::default());
/// assert_eq!(derived.max_health, 150);
/// assert_eq!(derived.max_mana, 75);
/// ```
#[must_use]
pub fn derive_combat_stats(base: &Stats, equipment: &Equipment) -> DerivedStats {
    let effective = base.combined(&equipment.total_bonus());

    let agility = Fixed::from_num(effective.agility);
    let crit_points = Fixed::from_num(effective.dexterity + effective.luck);

    DerivedStats {
        effective,
        max_health: BASE_MAX_HEALTH + effective.vitality * 10,
        max_mana: BASE_MAX_MANA + effective.intelligence * 5,
        move_speed: Fixed::from_num(BASE_MOVE_SPEED) + agility * Fixed::from_num(5),
        attack_speed: Fixed::ONE + agility * ratio(2, 100),
        crit_chance: crit_points * ratio(1, 2),
    }
}
