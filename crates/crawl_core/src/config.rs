//! Run configuration.
//!
//! Every tuning constant the simulation reads lives here. Defaults match
//! the shipped game; a RON file may override any subset of fields.
//!
//! ```ron
//! (
//!     seed: 7,
//!     dungeon: (normal_rooms: 3),
//!     boss: (health: 800),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{millis, Fixed};

/// Largest length, range or speed a config may set, in world units.
///
/// Keeps squared distances inside the room well within [`Fixed`] range.
pub const MAX_LENGTH: u32 = 1 << 15;

/// Largest damage, XP or regen amount a config may set.
pub const MAX_AMOUNT: u32 = 1 << 20;

/// Largest timer a config may set, in milliseconds (one hour).
pub const MAX_DURATION_MS: u32 = 3_600_000;

/// Most normal rooms a dungeon may have.
pub const MAX_ROOMS: usize = 256;

/// Most enemies in one room or one add wave.
pub const MAX_SPAWNS: u32 = 64;

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Lower bound.
    pub min: u32,
    /// Upper bound.
    pub max: u32,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for dungeon layout and reward rolls.
    pub seed: u64,
    /// Dungeon generation.
    pub dungeon: DungeonConfig,
    /// Player tuning.
    pub player: PlayerConfig,
    /// Regular enemy tuning.
    pub enemy: EnemyConfig,
    /// Boss tuning.
    pub boss: BossConfig,
    /// Camera viewport.
    pub camera: CameraConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            dungeon: DungeonConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            boss: BossConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

/// Dungeon layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Normal rooms before the boss room.
    pub normal_rooms: usize,
    /// Normal room width.
    pub room_width: Span,
    /// Normal room height.
    pub room_height: Span,
    /// Boss room width.
    pub boss_room_width: u32,
    /// Boss room height.
    pub boss_room_height: u32,
    /// Enemies placed in each normal room.
    pub enemies_per_room: Span,
    /// Inset from the right and bottom walls for spawn points.
    pub spawn_margin: u32,
    /// Horizontal gap added to the widest normal room to space rooms apart.
    pub room_gap: u32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            normal_rooms: 5,
            room_width: Span::new(400, 600),
            room_height: Span::new(300, 450),
            boss_room_width: 800,
            boss_room_height: 600,
            enemies_per_room: Span::new(3, 5),
            spawn_margin: 60,
            room_gap: 200,
        }
    }
}

/// Player tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Edge length of the player body.
    pub body_size: u32,
    /// Mana regained per second.
    pub mana_regen_per_second: u32,
    /// Speed of basic-attack bolts.
    pub projectile_speed: u32,
    /// Collision radius of player bolts.
    pub projectile_radius: u32,
    /// XP for killing a regular enemy.
    pub enemy_kill_xp: u32,
    /// XP for killing the boss.
    pub boss_kill_xp: u32,
    /// Kill-heal multiplier for the boss.
    pub boss_kill_heal_multiplier: u32,
    /// Dash length.
    pub dash_distance: u32,
    /// Retreat roll length.
    pub roll_distance: u32,
    /// Mana restored per target hit by Arcane Drain.
    pub arcane_drain_mana_per_target: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            body_size: 40,
            mana_regen_per_second: 5,
            projectile_speed: 400,
            projectile_radius: 5,
            enemy_kill_xp: 20,
            boss_kill_xp: 100,
            boss_kill_heal_multiplier: 5,
            dash_distance: 100,
            roll_distance: 80,
            arcane_drain_mana_per_target: 10,
        }
    }
}

/// Health, contact damage and speed of one enemy tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStatLine {
    /// Max health.
    pub health: u32,
    /// Damage per attack.
    pub damage: u32,
    /// Units per second.
    pub speed: u32,
}

/// Regular enemy tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Regular tier.
    pub normal: EnemyStatLine,
    /// Elite tier (last spawn in each room).
    pub elite: EnemyStatLine,
    /// Body edge length.
    pub size: u32,
    /// Milliseconds between attacks.
    pub attack_cooldown_ms: u32,
    /// Distance at which an enemy stops and attacks.
    pub attack_range: u32,
    /// Distance at which an idle enemy starts chasing.
    pub aggro_range: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            normal: EnemyStatLine {
                health: 50,
                damage: 5,
                speed: 100,
            },
            elite: EnemyStatLine {
                health: 100,
                damage: 10,
                speed: 120,
            },
            size: 30,
            attack_cooldown_ms: 1000,
            attack_range: 60,
            aggro_range: 150,
        }
    }
}

impl EnemyConfig {
    /// Seconds between attacks.
    #[must_use]
    pub fn attack_cooldown(&self) -> Fixed {
        millis(self.attack_cooldown_ms)
    }
}

/// Boss tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Max health.
    pub health: u32,
    /// Melee damage.
    pub damage: u32,
    /// Units per second.
    pub speed: u32,
    /// Melee reach.
    pub attack_range: u32,
    /// Chase trigger distance.
    pub aggro_range: u32,
    /// Body edge length.
    pub size: u32,
    /// Milliseconds between melee attacks.
    pub attack_cooldown_ms: u32,
    /// Milliseconds between add waves.
    pub add_spawn_cooldown_ms: u32,
    /// Adds per wave, spaced evenly around the boss.
    pub adds_per_wave: u32,
    /// Distance of add spawn points from the boss center.
    pub add_spawn_distance: u32,
    /// Bolt speed.
    pub bolt_speed: u32,
    /// Bolt damage.
    pub bolt_damage: u32,
    /// Bolt collision radius.
    pub bolt_radius: u32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            health: 500,
            damage: 15,
            speed: 80,
            attack_range: 80,
            aggro_range: 1000,
            size: 60,
            attack_cooldown_ms: 1000,
            add_spawn_cooldown_ms: 5000,
            adds_per_wave: 2,
            add_spawn_distance: 100,
            bolt_speed: 200,
            bolt_damage: 10,
            bolt_radius: 8,
        }
    }
}

/// Camera viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Viewport width in world units.
    pub viewport_width: u32,
    /// Viewport height in world units.
    pub viewport_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1600,
            viewport_height: 900,
        }
    }
}

impl GameConfig {
    /// Load and validate a RON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), seed = config.seed, "Loaded config");
        Ok(config)
    }

    /// Parse and validate RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|source| GameError::ConfigParse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and sizes.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let dungeon = &self.dungeon;

        for (name, span) in [
            ("room_width", dungeon.room_width),
            ("room_height", dungeon.room_height),
            ("enemies_per_room", dungeon.enemies_per_room),
        ] {
            if span.min > span.max {
                errors.push(format!("dungeon.{name}: min {} exceeds max {}", span.min, span.max));
            }
        }
        if dungeon.enemies_per_room.min == 0 {
            errors.push("dungeon.enemies_per_room: rooms need at least one enemy".to_string());
        }
        if dungeon.spawn_margin >= dungeon.room_width.min.min(dungeon.room_height.min) {
            errors.push(format!(
                "dungeon.spawn_margin {} leaves no room to spawn enemies",
                dungeon.spawn_margin
            ));
        }
        if dungeon.boss_room_width <= self.boss.size || dungeon.boss_room_height <= self.boss.size {
            errors.push("dungeon: boss room is smaller than the boss".to_string());
        }

        for (name, value) in [
            ("player.body_size", self.player.body_size),
            ("player.projectile_speed", self.player.projectile_speed),
            ("enemy.size", self.enemy.size),
            ("enemy.normal.health", self.enemy.normal.health),
            ("enemy.elite.health", self.enemy.elite.health),
            ("boss.size", self.boss.size),
            ("boss.health", self.boss.health),
            ("boss.bolt_speed", self.boss.bolt_speed),
            ("camera.viewport_width", self.camera.viewport_width),
            ("camera.viewport_height", self.camera.viewport_height),
        ] {
            if value == 0 {
                errors.push(format!("{name} must be positive"));
            }
        }

        if self.enemy.attack_range > self.enemy.aggro_range {
            errors.push("enemy.attack_range exceeds aggro_range".to_string());
        }

        self.check_limits(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvalidConfig(errors))
        }
    }

    /// Upper bounds that keep every value convertible to [`Fixed`] and
    /// every dungeon coordinate in range.
    fn check_limits(&self, errors: &mut Vec<String>) {
        let (dungeon, player, enemy, boss) = (&self.dungeon, &self.player, &self.enemy, &self.boss);

        for (name, value) in [
            ("dungeon.room_width.max", dungeon.room_width.max),
            ("dungeon.room_height.max", dungeon.room_height.max),
            ("dungeon.boss_room_width", dungeon.boss_room_width),
            ("dungeon.boss_room_height", dungeon.boss_room_height),
            ("dungeon.spawn_margin", dungeon.spawn_margin),
            ("dungeon.room_gap", dungeon.room_gap),
            ("player.body_size", player.body_size),
            ("player.projectile_speed", player.projectile_speed),
            ("player.projectile_radius", player.projectile_radius),
            ("player.dash_distance", player.dash_distance),
            ("player.roll_distance", player.roll_distance),
            ("enemy.size", enemy.size),
            ("enemy.normal.speed", enemy.normal.speed),
            ("enemy.elite.speed", enemy.elite.speed),
            ("enemy.attack_range", enemy.attack_range),
            ("enemy.aggro_range", enemy.aggro_range),
            ("boss.speed", boss.speed),
            ("boss.attack_range", boss.attack_range),
            ("boss.aggro_range", boss.aggro_range),
            ("boss.size", boss.size),
            ("boss.add_spawn_distance", boss.add_spawn_distance),
            ("boss.bolt_speed", boss.bolt_speed),
            ("boss.bolt_radius", boss.bolt_radius),
            ("camera.viewport_width", self.camera.viewport_width),
            ("camera.viewport_height", self.camera.viewport_height),
        ] {
            if value > MAX_LENGTH {
                errors.push(format!("{name} {value} exceeds the limit of {MAX_LENGTH}"));
            }
        }

        for (name, value) in [
            ("player.mana_regen_per_second", player.mana_regen_per_second),
            ("player.enemy_kill_xp", player.enemy_kill_xp),
            ("player.boss_kill_xp", player.boss_kill_xp),
            ("player.boss_kill_heal_multiplier", player.boss_kill_heal_multiplier),
            ("player.arcane_drain_mana_per_target", player.arcane_drain_mana_per_target),
            ("enemy.normal.health", enemy.normal.health),
            ("enemy.normal.damage", enemy.normal.damage),
            ("enemy.elite.health", enemy.elite.health),
            ("enemy.elite.damage", enemy.elite.damage),
            ("boss.health", boss.health),
            ("boss.damage", boss.damage),
            ("boss.bolt_damage", boss.bolt_damage),
        ] {
            if value > MAX_AMOUNT {
                errors.push(format!("{name} {value} exceeds the limit of {MAX_AMOUNT}"));
            }
        }

        for (name, value) in [
            ("enemy.attack_cooldown_ms", enemy.attack_cooldown_ms),
            ("boss.attack_cooldown_ms", boss.attack_cooldown_ms),
            ("boss.add_spawn_cooldown_ms", boss.add_spawn_cooldown_ms),
        ] {
            if value > MAX_DURATION_MS {
                errors.push(format!("{name} {value} exceeds the limit of {MAX_DURATION_MS}"));
            }
        }

        if dungeon.normal_rooms > MAX_ROOMS {
            errors.push(format!(
                "dungeon.normal_rooms {} exceeds the limit of {MAX_ROOMS}",
                dungeon.normal_rooms
            ));
        }
        if dungeon.enemies_per_room.max > MAX_SPAWNS {
            errors.push(format!(
                "dungeon.enemies_per_room max {} exceeds the limit of {MAX_SPAWNS}",
                dungeon.enemies_per_room.max
            ));
        }
        if boss.adds_per_wave > MAX_SPAWNS {
            errors.push(format!(
                "boss.adds_per_wave {} exceeds the limit of {MAX_SPAWNS}",
                boss.adds_per_wave
            ));
        }
    }
}
