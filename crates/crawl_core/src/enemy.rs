//! Regular enemies and their chase/attack state machine.

use crate::combat::Combatant;
use crate::components::{Body, Pool};
use crate::config::{EnemyConfig, EnemyStatLine};
use crate::effects::EffectSet;
use crate::math::{decay, millis, Fixed, Vec2Fixed};
use crate::player::Player;

/// Milliseconds an enemy flashes after taking a hit.
pub const HIT_FLASH_MS: u32 = 200;
/// Milliseconds an enemy flashes after attacking.
pub const ATTACK_FLASH_MS: u32 = 150;

/// AI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyState {
    /// Player out of aggro range.
    #[default]
    Idle,
    /// Closing in on the player.
    Chasing,
    /// Player within attack range; standing still.
    Attacking,
}

/// A regular or elite enemy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Enemy {
    /// Footprint.
    pub body: Body,
    /// Health.
    pub health: Pool,
    /// Damage per attack.
    pub damage: u32,
    /// Base units per second.
    pub move_speed: Fixed,
    /// Distance at which the enemy stops and attacks.
    pub attack_range: Fixed,
    /// Distance at which an idle enemy starts chasing.
    pub aggro_range: Fixed,
    /// Seconds between attacks.
    pub attack_cooldown: Fixed,
    /// Seconds until the next attack is allowed.
    pub current_cooldown: Fixed,
    /// Seconds of hit flash left.
    pub hit_flash: Fixed,
    /// Seconds of attack flash left.
    pub attack_flash: Fixed,
    /// Sprite orientation, follows horizontal movement.
    pub facing_right: bool,
    /// AI state.
    pub state: EnemyState,
    /// Cleared when health reaches zero.
    pub alive: bool,
    /// Elite tier.
    pub elite: bool,
    /// Active status effects.
    pub effects: EffectSet,
    /// Set once the kill reward for this enemy has been paid out.
    pub reward_claimed: bool,
}

impl Enemy {
    /// Spawn an enemy with its top-left corner at `position`.
    #[must_use]
    pub fn spawn(position: Vec2Fixed, elite: bool, config: &EnemyConfig) -> Self {
        let line = if elite { config.elite } else { config.normal };
        let mut enemy = Self::from_parts(position, &line, config);
        enemy.elite = elite;
        enemy
    }

    /// Build a non-elite enemy from an explicit stat line.
    #[must_use]
    pub fn from_parts(position: Vec2Fixed, line: &EnemyStatLine, config: &EnemyConfig) -> Self {
        Self {
            body: Body::new(position, Fixed::from_num(config.size)),
            health: Pool::new(line.health),
            damage: line.damage,
            move_speed: Fixed::from_num(line.speed),
            attack_range: Fixed::from_num(config.attack_range),
            aggro_range: Fixed::from_num(config.aggro_range),
            attack_cooldown: config.attack_cooldown(),
            current_cooldown: Fixed::ZERO,
            hit_flash: Fixed::ZERO,
            attack_flash: Fixed::ZERO,
            facing_right: true,
            state: EnemyState::Idle,
            alive: true,
            elite: false,
            effects: EffectSet::new(),
            reward_claimed: false,
        }
    }

    /// Per-frame update against the player's center.
    ///
    /// Decays timers, ticks effects (periodic damage may kill), then runs
    /// the state machine. Immobilized enemies still change state but do
    /// not move.
    pub fn update(&mut self, dt: Fixed, player_center: Vec2Fixed) {
        if !self.alive {
            return;
        }

        self.current_cooldown = decay(self.current_cooldown, dt);
        self.hit_flash = decay(self.hit_flash, dt);
        self.attack_flash = decay(self.attack_flash, dt);

        let mut periodic = Vec::new();
        self.effects.tick(dt, |_, amount| periodic.push(amount));
        for amount in periodic {
            Combatant::take_damage(self, amount);
        }
        if !self.alive {
            return;
        }

        self.think(player_center);

        if self.state == EnemyState::Chasing && !self.in_attack_range(player_center) {
            self.chase(player_center, dt);
        }
    }

    /// Distance-driven state transition.
    ///
    /// Aggro range starts a chase from idle, leaving it resets to idle,
    /// attack range always forces attacking, and dropping out of attack
    /// range falls back to chasing.
    pub fn think(&mut self, player_center: Vec2Fixed) {
        let distance_sq = self.body.center().distance_squared(player_center);

        if distance_sq <= self.aggro_range * self.aggro_range {
            if self.state == EnemyState::Idle {
                self.state = EnemyState::Chasing;
            }
        } else {
            self.state = EnemyState::Idle;
        }

        if distance_sq <= self.attack_range * self.attack_range {
            self.state = EnemyState::Attacking;
        } else if self.state == EnemyState::Attacking {
            self.state = EnemyState::Chasing;
        }
    }

    fn in_attack_range(&self, player_center: Vec2Fixed) -> bool {
        self.body.center().distance_squared(player_center) <= self.attack_range * self.attack_range
    }

    fn chase(&mut self, player_center: Vec2Fixed, dt: Fixed) {
        let speed = self.move_speed * self.effects.speed_multiplier();
        if speed == Fixed::ZERO {
            return;
        }
        let direction = (player_center - self.body.center()).normalize();
        let step = direction.scale(speed * dt);
        self.body.position += step;

        if step.x > Fixed::ZERO {
            self.facing_right = true;
        } else if step.x < Fixed::ZERO {
            self.facing_right = false;
        }
    }

    /// Whether the enemy would hit this frame.
    #[must_use]
    pub fn ready_to_attack(&self) -> bool {
        self.alive
            && self.state == EnemyState::Attacking
            && self.current_cooldown <= Fixed::ZERO
            && !self.effects.is_immobilized()
    }

    /// Hit the player if in the attacking state with the cooldown elapsed.
    ///
    /// Returns the health the player lost, or `None` when no attack happened.
    pub fn try_attack(&mut self, player: &mut Player) -> Option<u32> {
        if !self.ready_to_attack() {
            return None;
        }
        let lost = player.take_damage(self.damage);
        self.attack_flash = millis(ATTACK_FLASH_MS);
        self.current_cooldown = self.attack_cooldown;
        tracing::trace!(damage = self.damage, lost, "Enemy attack");
        Some(lost)
    }
}

impl Combatant for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = self.health.drain(self.effects.reduce_incoming(amount));
        if self.health.is_empty() {
            self.alive = false;
        }
        self.hit_flash = millis(HIT_FLASH_MS);
        lost
    }

    fn effects(&self) -> &EffectSet {
        &self.effects
    }

    fn effects_mut(&mut self) -> &mut EffectSet {
        &mut self.effects
    }
}
