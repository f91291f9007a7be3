//! The boss: an enemy core plus phases, add waves and ranged bolts.

use crate::combat::Combatant;
use crate::components::{Body, Pool};
use crate::config::{BossConfig, EnemyConfig, EnemyStatLine};
use crate::effects::EffectSet;
use crate::enemy::Enemy;
use crate::math::{decay, millis, turn_direction, Fixed, Vec2Fixed};
use crate::player::Player;
use crate::projectile::{Projectile, ProjectileOwner};

/// Health-driven behavior tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BossPhase {
    /// At least 66% health: melee only.
    #[default]
    One,
    /// Below 66%: adds and bolts unlocked.
    Two,
    /// Below 33%.
    Three,
}

impl BossPhase {
    /// Phase for the given health pool.
    #[must_use]
    pub fn for_health(health: &Pool) -> Self {
        match health.percentage() {
            0..=32 => Self::Three,
            33..=65 => Self::Two,
            _ => Self::One,
        }
    }
}

/// Boss state. Movement, melee and effects come from the embedded [`Enemy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boss {
    /// Shared enemy behavior.
    pub core: Enemy,
    /// Current phase.
    pub phase: BossPhase,
    /// Seconds until the next add wave may spawn.
    pub add_spawn_timer: Fixed,
    /// Seconds between add waves.
    pub add_spawn_cooldown: Fixed,
    /// Bolts in flight.
    pub projectiles: Vec<Projectile>,
    adds_per_wave: u32,
    add_spawn_distance: Fixed,
    bolt_speed: Fixed,
    bolt_damage: u32,
    bolt_radius: Fixed,
}

impl Boss {
    /// Spawn the boss centered on `center`.
    #[must_use]
    pub fn spawn(center: Vec2Fixed, config: &BossConfig, enemy: &EnemyConfig) -> Self {
        let size = Fixed::from_num(config.size);
        let line = EnemyStatLine {
            health: config.health,
            damage: config.damage,
            speed: config.speed,
        };
        let mut core = Enemy::from_parts(Body::centered_at(center, size).position, &line, enemy);
        core.body.size = size;
        core.attack_range = Fixed::from_num(config.attack_range);
        core.aggro_range = Fixed::from_num(config.aggro_range);
        core.attack_cooldown = millis(config.attack_cooldown_ms);

        Self {
            core,
            phase: BossPhase::One,
            add_spawn_timer: Fixed::ZERO,
            add_spawn_cooldown: millis(config.add_spawn_cooldown_ms),
            projectiles: Vec::new(),
            adds_per_wave: config.adds_per_wave,
            add_spawn_distance: Fixed::from_num(config.add_spawn_distance),
            bolt_speed: Fixed::from_num(config.bolt_speed),
            bolt_damage: config.bolt_damage,
            bolt_radius: Fixed::from_num(config.bolt_radius),
        }
    }

    /// Per-frame update.
    ///
    /// Recomputes the phase, runs the enemy update, counts down the add
    /// timer, advances live bolts (dropping dead ones) and fires a new bolt
    /// when about to strike in phase two or later.
    ///
    /// Returns the new phase when it changed this frame.
    pub fn update(&mut self, dt: Fixed, player_center: Vec2Fixed) -> Option<BossPhase> {
        if !self.core.alive {
            return None;
        }

        let previous = self.phase;
        self.phase = BossPhase::for_health(&self.core.health);

        self.core.update(dt, player_center);
        self.add_spawn_timer = decay(self.add_spawn_timer, dt);

        self.projectiles.retain(|bolt| bolt.alive);
        for bolt in &mut self.projectiles {
            bolt.advance(dt);
        }

        if self.phase >= BossPhase::Two && self.core.ready_to_attack() {
            let origin = self.core.body.center();
            if let Some(bolt) = Projectile::aimed(
                origin,
                player_center,
                self.bolt_speed,
                self.bolt_damage,
                self.bolt_radius,
                ProjectileOwner::Boss,
            ) {
                self.projectiles.push(bolt);
            }
        }

        (self.phase != previous).then(|| {
            tracing::debug!(phase = ?self.phase, health = self.core.health.current, "Boss phase change");
            self.phase
        })
    }

    /// Whether an add wave is due.
    #[must_use]
    pub fn should_spawn_adds(&self) -> bool {
        self.core.alive && self.phase >= BossPhase::Two && self.add_spawn_timer <= Fixed::ZERO
    }

    /// Restart the add-wave countdown.
    pub fn reset_add_spawn_timer(&mut self) {
        self.add_spawn_timer = self.add_spawn_cooldown;
    }

    /// Centers for the next add wave, evenly spaced around the boss.
    #[must_use]
    pub fn add_spawn_points(&self) -> Vec<Vec2Fixed> {
        let center = self.core.body.center();
        (0..self.adds_per_wave)
            .map(|i| center + turn_direction(i, self.adds_per_wave).scale(self.add_spawn_distance))
            .collect()
    }

    /// Melee strike, same rules as a regular enemy.
    pub fn try_attack(&mut self, player: &mut Player) -> Option<u32> {
        self.core.try_attack(player)
    }
}

impl Combatant for Boss {
    fn body(&self) -> &Body {
        &self.core.body
    }

    fn is_alive(&self) -> bool {
        self.core.alive
    }

    fn take_damage(&mut self, amount: u32) -> u32 {
        self.core.take_damage(amount)
    }

    fn effects(&self) -> &EffectSet {
        &self.core.effects
    }

    fn effects_mut(&mut self) -> &mut EffectSet {
        &mut self.core.effects
    }
}
