//! Combat resolution: damage formulas, target selection and skill
//! application.
//!
//! Targets are addressed through [`TargetHandle`], resolved once when a
//! skill picks its targets and dereferenced through an [`Arena`] that
//! borrows every combatant of the current room.

use crate::boss::Boss;
use crate::components::Body;
use crate::effects::{EffectKind, EffectSet};
use crate::enemy::Enemy;
use crate::math::{floor_u32, Fixed, Vec2Fixed};
use crate::player::Player;
use crate::skills::{DamageKind, DamageSpec, Skill, TargetingKind, TargetingSpec};
use crate::stats::Stats;

/// Capabilities shared by everything that can be hit.
pub trait Combatant {
    /// Footprint.
    fn body(&self) -> &Body;

    /// Center of the footprint.
    fn center(&self) -> Vec2Fixed {
        self.body().center()
    }

    /// Whether the combatant is still in the fight.
    fn is_alive(&self) -> bool;

    /// Apply incoming damage, returning health actually lost.
    fn take_damage(&mut self, amount: u32) -> u32;

    /// Active effects.
    fn effects(&self) -> &EffectSet;

    /// Active effects, mutable.
    fn effects_mut(&mut self) -> &mut EffectSet;
}

/// Reference to one combatant in the current room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetHandle {
    /// The player.
    Player,
    /// Index into the room's enemy list.
    Enemy(usize),
    /// The boss.
    Boss,
}

/// One damage application, reported to the frame events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DamageEvent {
    /// Who was hit.
    pub target: TargetHandle,
    /// Damage dealt before shields and reductions.
    pub amount: u32,
    /// Whether the hit took the target from alive to dead.
    pub killed: bool,
}

/// Mutable view of every combatant in the room.
pub struct Arena<'a> {
    /// The caster.
    pub player: &'a mut Player,
    /// Regular enemies.
    pub enemies: &'a mut [Enemy],
    /// Boss, in the boss room.
    pub boss: Option<&'a mut Boss>,
}

impl Arena<'_> {
    /// Look up a combatant by handle.
    pub fn get_mut(&mut self, handle: TargetHandle) -> Option<&mut dyn Combatant> {
        match handle {
            TargetHandle::Player => Some(&mut *self.player as &mut dyn Combatant),
            TargetHandle::Enemy(index) => self
                .enemies
                .get_mut(index)
                .map(|enemy| enemy as &mut dyn Combatant),
            TargetHandle::Boss => self.boss.as_deref_mut().map(|boss| boss as &mut dyn Combatant),
        }
    }

    /// Damage a combatant, recording whether the hit killed it.
    pub fn strike(&mut self, handle: TargetHandle, amount: u32) -> Option<DamageEvent> {
        let target = self.get_mut(handle)?;
        let was_alive = target.is_alive();
        target.take_damage(amount);
        Some(DamageEvent {
            target: handle,
            amount,
            killed: was_alive && !target.is_alive(),
        })
    }
}

/// Evaluate a damage formula: `base + Σ stat × factor`.
///
/// Crit fields on the spec are not rolled.
#[must_use]
pub fn compute_damage(spec: &DamageSpec, stats: &Stats) -> Fixed {
    spec.scaling.iter().fold(spec.base, |total, term| {
        total + Fixed::from_num(stats.get(term.stat)) * term.factor
    })
}

/// Raw skill damage after the caster's damage boost, floored.
#[must_use]
pub fn boosted_damage(spec: &DamageSpec, caster: &Player) -> u32 {
    let raw = compute_damage(spec, &caster.derived().effective);
    let boost = Fixed::ONE + caster.effects.magnitude(EffectKind::DamageBoost);
    floor_u32(raw * boost)
}

/// Pick targets for a skill cast from `caster` toward `aim`.
///
/// Regular enemies are scanned in list order and the scan stops once
/// `max_targets` is reached, checked after each hit, so a zero cap still
/// yields the first enemy in reach. The boss is checked afterwards on its
/// own and is not subject to the cap.
#[must_use]
pub fn resolve_targets(
    caster: Vec2Fixed,
    aim: Vec2Fixed,
    spec: &TargetingSpec,
    enemies: &[Enemy],
    boss: Option<&Boss>,
) -> Vec<TargetHandle> {
    let (center, reach) = match spec.kind {
        TargetingKind::SelfCast => return vec![TargetHandle::Player],
        TargetingKind::Enemy => {
            if spec.range <= Fixed::ZERO {
                return Vec::new();
            }
            (caster, spec.range)
        }
        TargetingKind::Area => {
            let center = if spec.range == Fixed::ZERO { caster } else { aim };
            (center, spec.radius)
        }
    };
    let reach_sq = reach * reach;

    let mut targets = Vec::new();
    for (index, enemy) in enemies.iter().enumerate() {
        if enemy.alive && enemy.body.center().distance_squared(center) <= reach_sq {
            targets.push(TargetHandle::Enemy(index));
            if targets.len() >= spec.max_targets {
                break;
            }
        }
    }

    if let Some(boss) = boss {
        if boss.is_alive() && boss.center().distance_squared(center) <= reach_sq {
            targets.push(TargetHandle::Boss);
        }
    }

    targets
}

/// Whether the player may cast `skill` right now.
#[must_use]
pub fn can_cast(caster: &Player, skill: &Skill) -> bool {
    if !skill.can_use() {
        return false;
    }
    if skill.mana_cost > 0 && !caster.mana.has(skill.mana_cost) {
        return false;
    }
    !caster.effects.blocks_casting()
}

/// Resolve a skill against already-selected targets.
///
/// For each target: deal damage (boosted by the caster's DamageBoost),
/// heal the caster by class lifesteal on physical hits and by any
/// Lifesteal effect, then apply the skill's effects.
pub fn apply_skill(arena: &mut Arena<'_>, skill: &Skill, targets: &[TargetHandle]) -> Vec<DamageEvent> {
    let mut hits = Vec::new();
    let damage = skill
        .damage
        .as_ref()
        .map(|spec| (boosted_damage(spec, arena.player), spec.kind));

    for &handle in targets {
        if let Some((amount, kind)) = damage {
            if let Some(hit) = arena.strike(handle, amount) {
                tracing::trace!(skill = ?skill.kind, target = ?handle, amount, "Skill hit");
                hits.push(hit);

                let caster = &mut *arena.player;
                if kind == DamageKind::Physical {
                    caster.heal(caster.class.lifesteal_heal(amount));
                }
                let lifesteal = caster.effects.magnitude(EffectKind::Lifesteal);
                if lifesteal > Fixed::ZERO {
                    caster.heal(floor_u32(Fixed::from_num(amount) * lifesteal));
                }
            }
        }

        if let Some(target) = arena.get_mut(handle) {
            for effect in &skill.effects {
                target.effects_mut().apply(*effect);
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassKind;
    use crate::config::{BossConfig, EnemyConfig, PlayerConfig};
    use crate::effects::Effect;
    use crate::math::ratio;
    use crate::skills::SkillKind;
    use crate::stats::StatKind;

    fn player(class: ClassKind) -> Player {
        Player::new(class, Vec2Fixed::from_ints(0, 0), &PlayerConfig::default())
    }

    fn enemy_at(x: i32, y: i32) -> Enemy {
        let mut enemy = Enemy::spawn(Vec2Fixed::ZERO, false, &EnemyConfig::default());
        enemy.body = Body::centered_at(Vec2Fixed::from_ints(x, y), enemy.body.size);
        enemy
    }

    fn boss_at(x: i32, y: i32) -> Boss {
        Boss::spawn(Vec2Fixed::from_ints(x, y), &BossConfig::default(), &EnemyConfig::default())
    }

    #[test]
    fn test_compute_damage_scaling() {
        let whirlwind = Skill::new(SkillKind::Whirlwind);
        let spec = whirlwind.damage.as_ref().expect("whirlwind deals damage");
        // 8 + 5 × 1.5
        assert_eq!(compute_damage(spec, &Stats::starting()), Fixed::from_num(15.5));
    }

    #[test]
    fn test_self_targeting() {
        let targets = resolve_targets(
            Vec2Fixed::ZERO,
            Vec2Fixed::from_ints(100, 0),
            &TargetingSpec::self_cast(),
            &[],
            None,
        );
        assert_eq!(targets, vec![TargetHandle::Player]);
    }

    #[test]
    fn test_enemy_targeting_caps_regular_enemies_only() {
        let enemies = vec![enemy_at(50, 0), enemy_at(60, 0), enemy_at(70, 0), enemy_at(500, 0)];
        let boss = boss_at(0, 80);
        let spec = TargetingSpec::enemies_in_range(150, 2);
        let targets = resolve_targets(Vec2Fixed::ZERO, Vec2Fixed::ZERO, &spec, &enemies, Some(&boss));
        assert_eq!(
            targets,
            vec![TargetHandle::Enemy(0), TargetHandle::Enemy(1), TargetHandle::Boss]
        );
    }

    #[test]
    fn test_zero_cap_still_takes_first_enemy() {
        let enemies = vec![enemy_at(120, 0), enemy_at(50, 0), enemy_at(60, 0)];
        let boss = boss_at(0, 80);

        let spec = TargetingSpec::enemies_in_range(100, 0);
        let targets = resolve_targets(Vec2Fixed::ZERO, Vec2Fixed::ZERO, &spec, &enemies, Some(&boss));
        assert_eq!(targets, vec![TargetHandle::Enemy(1), TargetHandle::Boss]);

        let spec = TargetingSpec::area_around_caster(100, 0);
        let targets = resolve_targets(Vec2Fixed::ZERO, Vec2Fixed::ZERO, &spec, &enemies, None);
        assert_eq!(targets, vec![TargetHandle::Enemy(1)]);
    }

    #[test]
    fn test_enemy_targeting_skips_dead() {
        let mut enemies = vec![enemy_at(50, 0), enemy_at(60, 0)];
        enemies[0].alive = false;
        let spec = TargetingSpec::enemies_in_range(150, 3);
        let targets = resolve_targets(Vec2Fixed::ZERO, Vec2Fixed::ZERO, &spec, &enemies, None);
        assert_eq!(targets, vec![TargetHandle::Enemy(1)]);
    }

    #[test]
    fn test_area_centers_on_aim_when_range_set() {
        let enemies = vec![enemy_at(0, 0), enemy_at(300, 0)];
        let mut spec = TargetingSpec::area_around_caster(50, 5);

        let around_caster =
            resolve_targets(Vec2Fixed::ZERO, Vec2Fixed::from_ints(300, 0), &spec, &enemies, None);
        assert_eq!(around_caster, vec![TargetHandle::Enemy(0)]);

        spec.range = Fixed::from_num(400);
        let around_aim =
            resolve_targets(Vec2Fixed::ZERO, Vec2Fixed::from_ints(300, 0), &spec, &enemies, None);
        assert_eq!(around_aim, vec![TargetHandle::Enemy(1)]);
    }

    #[test]
    fn test_can_cast_gates() {
        let mut mage = player(ClassKind::Caster);
        let mut shield = Skill::new(SkillKind::ManaShield);
        assert!(can_cast(&mage, &shield));

        shield.start_cooldown();
        let mana_before = mage.mana;
        assert!(!can_cast(&mage, &shield));
        assert_eq!(mage.mana, mana_before);
        assert_eq!(shield.current_cooldown, shield.cooldown);

        let shield = Skill::new(SkillKind::ManaShield);
        mage.mana.current = 19;
        assert!(!can_cast(&mage, &shield));

        mage.mana.current = 75;
        mage.effects.apply(Effect::timed(EffectKind::Silence, Fixed::ONE, Fixed::ONE));
        assert!(!can_cast(&mage, &shield));
    }

    #[test]
    fn test_apply_skill_physical_lifesteal_stacks_with_effect() {
        let mut warrior = player(ClassKind::Melee);
        warrior.health.current = 100;
        warrior.stats.add(StatKind::Strength, 3);
        warrior
            .effects
            .apply(Effect::timed(EffectKind::Lifesteal, Fixed::from_num(5), ratio(1, 4)));
        let mut enemies = vec![enemy_at(30, 0)];
        enemies[0].health = crate::components::Pool::new(500);

        let whirlwind = Skill::new(SkillKind::Whirlwind);
        let mut arena = Arena {
            player: &mut warrior,
            enemies: &mut enemies,
            boss: None,
        };
        // 8 + 8 × 1.5 = 20
        let hits = apply_skill(&mut arena, &whirlwind, &[TargetHandle::Enemy(0)]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].amount, 20);
        assert!(!hits[0].killed);
        assert_eq!(enemies[0].health.current, 480);
        // class 20% → 4, effect 25% → 5
        assert_eq!(warrior.health.current, 109);
    }

    #[test]
    fn test_apply_skill_damage_boost() {
        let mut mage = player(ClassKind::Caster);
        mage.effects
            .apply(Effect::timed(EffectKind::DamageBoost, Fixed::ONE, ratio(1, 2)));
        let mut enemies = vec![enemy_at(30, 0)];
        let nova = Skill::new(SkillKind::FrostNova);
        let mut arena = Arena {
            player: &mut mage,
            enemies: &mut enemies,
            boss: None,
        };
        // (10 + 5) × 1.5 = 22.5 → 22
        let hits = apply_skill(&mut arena, &nova, &[TargetHandle::Enemy(0)]);
        assert_eq!(hits[0].amount, 22);
        assert!(enemies[0].effects.has(EffectKind::Slow));
        // magical damage never triggers class lifesteal
        assert!(mage.health.is_full());
    }

    #[test]
    fn test_apply_skill_effects_reach_boss_core() {
        let mut ranger = player(ClassKind::Ranged);
        let mut boss = boss_at(0, 0);
        let mut skill = Skill::new(SkillKind::FrostNova);
        skill.damage = None;
        let mut arena = Arena {
            player: &mut ranger,
            enemies: &mut [],
            boss: Some(&mut boss),
        };
        let hits = apply_skill(&mut arena, &skill, &[TargetHandle::Boss]);
        assert!(hits.is_empty());
        assert!(boss.core.effects.has(EffectKind::Slow));
    }

    #[test]
    fn test_self_buff_lands_on_caster() {
        let mut warrior = player(ClassKind::Melee);
        let battle_cry = Skill::new(SkillKind::BattleCry);
        let mut arena = Arena {
            player: &mut warrior,
            enemies: &mut [],
            boss: None,
        };
        apply_skill(&mut arena, &battle_cry, &[TargetHandle::Player]);
        assert_eq!(warrior.effects.magnitude(EffectKind::DamageBoost), ratio(1, 2));
        assert_eq!(warrior.effects.magnitude(EffectKind::Lifesteal), ratio(1, 4));
    }

    #[test]
    fn test_strike_reports_kill_once() {
        let mut ranger = player(ClassKind::Ranged);
        let mut enemies = vec![enemy_at(30, 0)];
        let mut arena = Arena {
            player: &mut ranger,
            enemies: &mut enemies,
            boss: None,
        };
        let first = arena.strike(TargetHandle::Enemy(0), 60);
        let second = arena.strike(TargetHandle::Enemy(0), 60);
        assert_eq!(first.map(|hit| hit.killed), Some(true));
        assert_eq!(second.map(|hit| hit.killed), Some(false));
        assert!(arena.strike(TargetHandle::Enemy(5), 1).is_none());
    }
}
