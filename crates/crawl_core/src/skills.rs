//! Skill definitions and per-class loadouts.
//!
//! A [`Skill`] is immutable data plus one mutable field, its current
//! cooldown. How a skill picks targets, how it reaches them and what it
//! does on arrival are described by the spec structs below and resolved
//! by [`crate::combat`].

use crate::class::ClassKind;
use crate::effects::{Effect, EffectKind};
use crate::math::{decay, ratio, Fixed};
use crate::stats::StatKind;

/// How a skill chooses its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetingKind {
    /// The caster only.
    SelfCast,
    /// Living hostiles within `range` of the caster.
    Enemy,
    /// Living hostiles within `radius` of a center point.
    Area,
}

/// Targeting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetingSpec {
    /// Selection rule.
    pub kind: TargetingKind,
    /// Reach from the caster. For area skills a zero range centers the
    /// area on the caster instead of the aim point.
    pub range: Fixed,
    /// Area radius.
    pub radius: Fixed,
    /// Cap on regular enemies selected.
    pub max_targets: usize,
}

impl TargetingSpec {
    /// Self-targeted.
    #[must_use]
    pub const fn self_cast() -> Self {
        Self {
            kind: TargetingKind::SelfCast,
            range: Fixed::ZERO,
            radius: Fixed::ZERO,
            max_targets: 1,
        }
    }

    /// Hostiles within `range` of the caster.
    #[must_use]
    pub fn enemies_in_range(range: i32, max_targets: usize) -> Self {
        Self {
            kind: TargetingKind::Enemy,
            range: Fixed::from_num(range),
            radius: Fixed::ZERO,
            max_targets,
        }
    }

    /// Hostiles within `radius` of the caster.
    #[must_use]
    pub fn area_around_caster(radius: i32, max_targets: usize) -> Self {
        Self {
            kind: TargetingKind::Area,
            range: Fixed::ZERO,
            radius: Fixed::from_num(radius),
            max_targets,
        }
    }
}

/// How a skill reaches its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryKind {
    /// Resolved immediately on cast.
    Instant,
    /// Spawns a moving bolt toward the aim point.
    Projectile,
    /// Reserved; resolved like [`DeliveryKind::Instant`].
    Delayed,
}

/// Delivery parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeliverySpec {
    /// Delivery rule.
    pub kind: DeliveryKind,
    /// Projectile speed in units per second.
    pub speed: Fixed,
}

impl DeliverySpec {
    /// Instant delivery.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            kind: DeliveryKind::Instant,
            speed: Fixed::ZERO,
        }
    }

    /// Projectile delivery at `speed` units per second.
    #[must_use]
    pub fn projectile(speed: i32) -> Self {
        Self {
            kind: DeliveryKind::Projectile,
            speed: Fixed::from_num(speed),
        }
    }
}

/// Damage school. Only physical damage triggers class lifesteal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageKind {
    /// Weapon damage.
    Physical,
    /// Spell damage.
    Magical,
    /// Unmitigated damage.
    True,
}

/// One stat-scaling term of a damage formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scaling {
    /// Attribute read from the caster.
    pub stat: StatKind,
    /// Damage per attribute point.
    pub factor: Fixed,
}

/// Damage formula: `base + Σ stat × factor`.
///
/// `crit_chance` and `crit_multiplier` are carried as data but never
/// rolled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DamageSpec {
    /// Flat damage.
    pub base: Fixed,
    /// Stat scaling terms.
    pub scaling: Vec<Scaling>,
    /// Damage school.
    pub kind: DamageKind,
    /// Crit chance in percent.
    pub crit_chance: Fixed,
    /// Crit damage multiplier.
    pub crit_multiplier: Fixed,
}

impl DamageSpec {
    fn new(base: i32, kind: DamageKind, scaling: &[(StatKind, Fixed)]) -> Self {
        Self {
            base: Fixed::from_num(base),
            scaling: scaling
                .iter()
                .map(|&(stat, factor)| Scaling { stat, factor })
                .collect(),
            kind,
            crit_chance: Fixed::ZERO,
            crit_multiplier: Fixed::ONE,
        }
    }
}

/// Every skill in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillKind {
    /// Warrior: lunge toward the aim point.
    Dash,
    /// Warrior: hit everything around the caster.
    Whirlwind,
    /// Warrior: damage boost and lifesteal buff.
    BattleCry,
    /// Ranger: three bolts in a spread.
    MultiShot,
    /// Ranger: roll away from the aim point with a speed boost.
    RetreatRoll,
    /// Ranger: poisoned bolt.
    PoisonArrow,
    /// Mage: absorb damage with half of remaining mana.
    ManaShield,
    /// Mage: chilling burst around the caster.
    FrostNova,
    /// Mage: damage nearby enemies and recover mana per target.
    ArcaneDrain,
    /// Mage: burning bolt.
    Fireball,
}

/// A skill slot: immutable spec plus current cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Skill {
    /// Which skill this is.
    pub kind: SkillKind,
    /// Display name.
    pub name: &'static str,
    /// Seconds between casts.
    pub cooldown: Fixed,
    /// Mana spent per cast.
    pub mana_cost: u32,
    /// Target selection.
    pub targeting: TargetingSpec,
    /// Delivery.
    pub delivery: DeliverySpec,
    /// Damage formula, if the skill deals damage.
    pub damage: Option<DamageSpec>,
    /// Effects applied to every target.
    pub effects: Vec<Effect>,
    /// Seconds until the skill can be used again.
    pub current_cooldown: Fixed,
}

impl Skill {
    fn base(kind: SkillKind, name: &'static str, cooldown_secs: i32) -> Self {
        Self {
            kind,
            name,
            cooldown: Fixed::from_num(cooldown_secs),
            mana_cost: 0,
            targeting: TargetingSpec::self_cast(),
            delivery: DeliverySpec::instant(),
            damage: None,
            effects: Vec::new(),
            current_cooldown: Fixed::ZERO,
        }
    }

    /// Build the spec for `kind`, off cooldown.
    #[must_use]
    pub fn new(kind: SkillKind) -> Self {
        use StatKind::{Dexterity, Intelligence, Strength};

        let secs = |n: i32| Fixed::from_num(n);
        match kind {
            SkillKind::Dash => Self::base(kind, "Dash", 3),
            SkillKind::Whirlwind => Self {
                targeting: TargetingSpec::area_around_caster(90, 5),
                damage: Some(DamageSpec::new(8, DamageKind::Physical, &[(Strength, ratio(3, 2))])),
                ..Self::base(kind, "Whirlwind", 6)
            },
            SkillKind::BattleCry => Self {
                effects: vec![
                    Effect::timed(EffectKind::DamageBoost, secs(5), ratio(1, 2)),
                    Effect::timed(EffectKind::Lifesteal, secs(5), ratio(1, 4)),
                ],
                ..Self::base(kind, "Battle Cry", 12)
            },
            SkillKind::MultiShot => Self {
                delivery: DeliverySpec::projectile(400),
                ..Self::base(kind, "Multi-Shot", 5)
            },
            SkillKind::RetreatRoll => Self {
                effects: vec![Effect::timed(EffectKind::MoveSpeedBoost, secs(2), ratio(1, 2))],
                ..Self::base(kind, "Retreat Roll", 4)
            },
            SkillKind::PoisonArrow => Self {
                delivery: DeliverySpec::projectile(450),
                damage: Some(DamageSpec::new(6, DamageKind::Physical, &[(Dexterity, Fixed::ONE)])),
                effects: vec![Effect::periodic(EffectKind::Poison, secs(4), secs(3), Fixed::ONE)],
                ..Self::base(kind, "Poison Arrow", 6)
            },
            SkillKind::ManaShield => Self {
                mana_cost: 20,
                ..Self::base(kind, "Mana Shield", 8)
            },
            SkillKind::FrostNova => Self {
                mana_cost: 20,
                targeting: TargetingSpec::area_around_caster(120, 8),
                damage: Some(DamageSpec::new(10, DamageKind::Magical, &[(Intelligence, Fixed::ONE)])),
                effects: vec![Effect::timed(EffectKind::Slow, secs(3), ratio(1, 2))],
                ..Self::base(kind, "Frost Nova", 7)
            },
            SkillKind::ArcaneDrain => Self {
                mana_cost: 10,
                targeting: TargetingSpec::enemies_in_range(150, 3),
                damage: Some(DamageSpec::new(6, DamageKind::Magical, &[(Intelligence, Fixed::ONE)])),
                ..Self::base(kind, "Arcane Drain", 5)
            },
            SkillKind::Fireball => Self {
                mana_cost: 15,
                delivery: DeliverySpec::projectile(350),
                damage: Some(DamageSpec::new(
                    14,
                    DamageKind::Magical,
                    &[(Intelligence, Fixed::from_num(2))],
                )),
                effects: vec![Effect::periodic(EffectKind::Burn, secs(3), secs(4), Fixed::ONE)],
                ..Self::base(kind, "Fireball", 3)
            },
        }
    }

    /// Off cooldown.
    #[must_use]
    pub fn can_use(&self) -> bool {
        self.current_cooldown <= Fixed::ZERO
    }

    /// Put the skill on cooldown.
    pub fn start_cooldown(&mut self) {
        self.current_cooldown = self.cooldown;
    }

    /// Count the cooldown down by `dt`, never below zero.
    pub fn tick(&mut self, dt: Fixed) {
        self.current_cooldown = decay(self.current_cooldown, dt);
    }
}

/// Skill bar for a class, in slot order.
#[must_use]
pub fn class_skills(class: ClassKind) -> Vec<Skill> {
    let kinds: &[SkillKind] = match class {
        ClassKind::Melee => &[SkillKind::Dash, SkillKind::Whirlwind, SkillKind::BattleCry],
        ClassKind::Ranged => &[
            SkillKind::MultiShot,
            SkillKind::RetreatRoll,
            SkillKind::PoisonArrow,
        ],
        ClassKind::Caster => &[
            SkillKind::ManaShield,
            SkillKind::FrostNova,
            SkillKind::ArcaneDrain,
            SkillKind::Fireball,
        ],
    };
    kinds.iter().map(|&kind| Skill::new(kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_loadouts() {
        let melee: Vec<_> = class_skills(ClassKind::Melee).iter().map(|s| s.kind).collect();
        assert_eq!(melee[0], SkillKind::Dash);
        assert_eq!(class_skills(ClassKind::Ranged)[0].kind, SkillKind::MultiShot);
        assert_eq!(class_skills(ClassKind::Caster).len(), 4);
        assert!(class_skills(ClassKind::Caster)
            .iter()
            .all(|skill| skill.can_use()));
    }

    #[test]
    fn test_cooldown_cycle() {
        let mut dash = Skill::new(SkillKind::Dash);
        dash.start_cooldown();
        assert!(!dash.can_use());
        dash.tick(Fixed::from_num(2));
        assert!(!dash.can_use());
        dash.tick(Fixed::from_num(2));
        assert!(dash.can_use());
        assert_eq!(dash.current_cooldown, Fixed::ZERO);
    }

    #[test]
    fn test_mage_costs() {
        let skills = class_skills(ClassKind::Caster);
        let costs: Vec<u32> = skills.iter().map(|s| s.mana_cost).collect();
        assert_eq!(costs, vec![20, 20, 10, 15]);
    }

    #[test]
    fn test_projectile_skills_have_speed() {
        for kind in [SkillKind::MultiShot, SkillKind::PoisonArrow, SkillKind::Fireball] {
            let skill = Skill::new(kind);
            assert_eq!(skill.delivery.kind, DeliveryKind::Projectile);
            assert!(skill.delivery.speed > Fixed::ZERO);
        }
    }

    #[test]
    fn test_area_skills_center_on_caster() {
        let nova = Skill::new(SkillKind::FrostNova);
        assert_eq!(nova.targeting.kind, TargetingKind::Area);
        assert_eq!(nova.targeting.range, Fixed::ZERO);
        assert_eq!(nova.targeting.radius, Fixed::from_num(120));
    }
}
