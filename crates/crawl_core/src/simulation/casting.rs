//! Player actions: skill casts and basic attacks.

use super::{FrameEvents, Simulation};
use crate::class::ClassKind;
use crate::combat::{apply_skill, boosted_damage, can_cast, resolve_targets, Arena, Combatant, TargetHandle};
use crate::input::{InputSnapshot, SKILL_SLOTS};
use crate::math::{ratio, Fixed, Vec2Fixed};
use crate::player::Player;
use crate::projectile::{Projectile, ProjectileOwner};
use crate::skills::{DeliveryKind, SkillKind};

/// Lateral offsets of the three Multi-Shot bolts, as (numerator, denominator).
const MULTI_SHOT_SPREAD: [(i32, i32); 3] = [(-3, 10), (0, 1), (3, 10)];

impl Simulation {
    /// Try every pressed skill button in slot order.
    pub(super) fn handle_skill_input(&mut self, input: &InputSnapshot, events: &mut FrameEvents) {
        for slot in (0..SKILL_SLOTS).filter(|&slot| input.skills[slot]) {
            self.cast_skill(slot, input.aim, events);
        }
    }

    /// Cast the skill in `slot` toward `aim`.
    ///
    /// Returns `false` without side effects when the slot is empty or the
    /// skill cannot be cast. Otherwise mana is spent, the skill resolves by
    /// its delivery and its cooldown starts, even when a projectile could
    /// not be aimed.
    pub(super) fn cast_skill(&mut self, slot: usize, aim: Vec2Fixed, events: &mut FrameEvents) -> bool {
        let Self {
            config,
            player,
            enemies,
            boss,
            projectiles,
            ..
        } = self;
        let Some(player) = player.as_mut() else {
            return false;
        };
        let Some(skill) = player
            .skills
            .get(slot)
            .filter(|skill| can_cast(player, skill))
            .cloned()
        else {
            return false;
        };

        player.mana.drain(skill.mana_cost);
        let origin = player.body.center();
        let tuning = &config.player;

        match skill.delivery.kind {
            DeliveryKind::Instant | DeliveryKind::Delayed => {
                let targets = resolve_targets(origin, aim, &skill.targeting, enemies.as_slice(), boss.as_ref());

                match skill.kind {
                    SkillKind::Dash => displace(player, origin, aim, Fixed::from_num(tuning.dash_distance)),
                    SkillKind::RetreatRoll => {
                        displace(player, aim, origin, Fixed::from_num(tuning.roll_distance));
                    }
                    SkillKind::ManaShield => player.mana_shield.raise(player.mana.current / 2),
                    _ => {}
                }

                let mut arena = Arena {
                    player: &mut *player,
                    enemies: enemies.as_mut_slice(),
                    boss: boss.as_mut(),
                };
                events.hits.extend(apply_skill(&mut arena, &skill, &targets));

                if skill.kind == SkillKind::ArcaneDrain {
                    let count = u32::try_from(targets.len()).unwrap_or(u32::MAX);
                    player
                        .mana
                        .restore(tuning.arcane_drain_mana_per_target.saturating_mul(count));
                }
            }
            DeliveryKind::Projectile => {
                let speed = skill.delivery.speed;
                let radius = Fixed::from_num(tuning.projectile_radius);
                if skill.kind == SkillKind::MultiShot {
                    projectiles.extend(multi_shot(origin, aim, speed, player.attack_damage(), radius));
                } else {
                    let damage = skill
                        .damage
                        .as_ref()
                        .map_or(0, |spec| boosted_damage(spec, player));
                    let bolt = Projectile::aimed(origin, aim, speed, damage, radius, ProjectileOwner::Player);
                    projectiles.extend(bolt.map(|bolt| bolt.with_skill(skill.kind, &skill.effects)));
                }
            }
        }

        if let Some(cast) = player.skills.get_mut(slot) {
            cast.start_cooldown();
        }
        events.skills_cast.push(skill.kind);
        tracing::debug!(skill = skill.name, mana = player.mana.current, "Skill cast");
        true
    }

    /// Basic attack against regular enemies.
    ///
    /// Melee strikes the first living enemy under the aim point that is in
    /// reach. Caster commits to the first living enemy under the aim point
    /// and only strikes if it is in reach and mana allows. Ranged fires a
    /// bolt toward the aim point.
    pub(super) fn basic_attack_enemies(&mut self, aim: Vec2Fixed, events: &mut FrameEvents) {
        let Self {
            config,
            player,
            enemies,
            projectiles,
            ..
        } = self;
        let Some(player) = player.as_mut() else {
            return;
        };
        let origin = player.body.center();
        let reach = player.class.attack_range();
        let damage = player.attack_damage();
        let cost = player.class.spec().mana_cost;

        let target = match player.class {
            ClassKind::Melee => enemies
                .iter()
                .position(|enemy| enemy.alive && enemy.body.contains(aim) && within(origin, enemy.body.center(), reach)),
            ClassKind::Caster => {
                if !player.mana.has(cost) {
                    return;
                }
                enemies
                    .iter()
                    .position(|enemy| enemy.alive && enemy.body.contains(aim))
                    .filter(|&index| within(origin, enemies[index].body.center(), reach))
            }
            ClassKind::Ranged => {
                let bolt = Projectile::aimed(
                    origin,
                    aim,
                    Fixed::from_num(config.player.projectile_speed),
                    damage,
                    Fixed::from_num(config.player.projectile_radius),
                    ProjectileOwner::Player,
                );
                projectiles.extend(bolt);
                return;
            }
        };

        let Some(index) = target else {
            return;
        };
        let mut arena = Arena {
            player: &mut *player,
            enemies: enemies.as_mut_slice(),
            boss: None,
        };
        if let Some(hit) = arena.strike(TargetHandle::Enemy(index), damage) {
            events.hits.push(hit);
        }
        pay_for_hit(player, damage);
    }

    /// Basic attack against the boss. Ranged players reach the boss only
    /// through their bolts.
    pub(super) fn basic_attack_boss(&mut self, aim: Vec2Fixed, events: &mut FrameEvents) {
        let Self {
            player,
            enemies,
            boss,
            ..
        } = self;
        let (Some(player), Some(boss)) = (player.as_mut(), boss.as_mut()) else {
            return;
        };
        if player.class == ClassKind::Ranged || !boss.is_alive() || !boss.body().contains(aim) {
            return;
        }
        if !within(player.body.center(), boss.center(), player.class.attack_range()) {
            return;
        }
        if !player.mana.has(player.class.spec().mana_cost) {
            return;
        }

        let damage = player.attack_damage();
        let mut arena = Arena {
            player: &mut *player,
            enemies: enemies.as_mut_slice(),
            boss: Some(boss),
        };
        if let Some(hit) = arena.strike(TargetHandle::Boss, damage) {
            events.hits.push(hit);
        }
        pay_for_hit(player, damage);
    }
}

/// Class upkeep after a landed basic attack: lifesteal heal and mana cost.
fn pay_for_hit(player: &mut Player, damage: u32) {
    let class = player.class;
    player.heal(class.lifesteal_heal(damage));
    player.mana.drain(class.spec().mana_cost);
}

fn within(from: Vec2Fixed, to: Vec2Fixed, reach: Fixed) -> bool {
    from.distance_squared(to) <= reach * reach
}

/// Shift the player `distance` along the line from `from` to `to`.
/// Coinciding points leave the player in place.
fn displace(player: &mut Player, from: Vec2Fixed, to: Vec2Fixed, distance: Fixed) {
    player.body.position += from.step_towards(to, distance) - from;
}

/// Three bolts fanned around the aim direction.
///
/// Each direction is the aim vector plus a perpendicular offset, divided by
/// the aim distance, so the side bolts fly slightly faster than the center.
fn multi_shot(origin: Vec2Fixed, aim: Vec2Fixed, speed: Fixed, damage: u32, radius: Fixed) -> Vec<Projectile> {
    let delta = aim - origin;
    let distance = delta.length();
    if distance == Fixed::ZERO {
        return Vec::new();
    }

    MULTI_SHOT_SPREAD
        .iter()
        .map(|&(numerator, denominator)| {
            let spread = ratio(numerator, denominator);
            let direction = Vec2Fixed::new(
                (delta.x - delta.y * spread) / distance,
                (delta.x * spread + delta.y) / distance,
            );
            Projectile::new(origin, direction, speed, damage, radius, ProjectileOwner::Player)
                .with_skill(SkillKind::MultiShot, &[])
        })
        .collect()
}
