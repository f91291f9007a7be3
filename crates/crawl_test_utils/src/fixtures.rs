//! Test fixtures and helpers.
//!
//! Pre-built runs, entities and input snapshots for consistent testing.

use crawl_core::boss::Boss;
use crawl_core::class::ClassKind;
use crawl_core::components::Body;
use crawl_core::config::{BossConfig, EnemyConfig, GameConfig, PlayerConfig};
use crawl_core::enemy::Enemy;
use crawl_core::input::InputSnapshot;
use crawl_core::math::{ratio, Vec2Fixed};
use crawl_core::player::Player;
use crawl_core::simulation::{FrameEvents, RunState, Simulation};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Frame delta used by scenario tests. A power of two, so timers and
/// movement stay exact.
#[must_use]
pub fn frame_dt() -> I32F32 {
    ratio(1, 64)
}

/// Point from integer coordinates.
#[must_use]
pub fn point(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Default config with a specific seed.
#[must_use]
pub fn config_with_seed(seed: u64) -> GameConfig {
    GameConfig {
        seed,
        ..GameConfig::default()
    }
}

/// A simulation already in the first room with `class`.
///
/// # Panics
///
/// Panics if the run cannot be started, which only happens on a broken
/// state machine.
#[must_use]
pub fn started_run(class: ClassKind, seed: u64) -> Simulation {
    let mut sim = Simulation::new(config_with_seed(seed));
    sim.select_class(class).expect("fresh simulation is in the menu");
    sim.start_run().expect("fresh simulation is in the menu");
    sim
}

/// A player with default tuning centered on `(x, y)`.
#[must_use]
pub fn player_at(class: ClassKind, x: i32, y: i32) -> Player {
    Player::new(class, point(x, y), &PlayerConfig::default())
}

/// A regular enemy centered on `(x, y)`.
#[must_use]
pub fn enemy_at(x: i32, y: i32) -> Enemy {
    centered(Enemy::spawn(Vec2Fixed::ZERO, false, &EnemyConfig::default()), x, y)
}

/// An elite enemy centered on `(x, y)`.
#[must_use]
pub fn elite_at(x: i32, y: i32) -> Enemy {
    centered(Enemy::spawn(Vec2Fixed::ZERO, true, &EnemyConfig::default()), x, y)
}

/// A boss with default tuning centered on `(x, y)`.
#[must_use]
pub fn boss_at(x: i32, y: i32) -> Boss {
    Boss::spawn(point(x, y), &BossConfig::default(), &EnemyConfig::default())
}

fn centered(enemy: Enemy, x: i32, y: i32) -> Enemy {
    enemy.with_center(point(x, y))
}

/// Replace the room's enemies with regular enemies at `offsets` from the
/// player's center.
///
/// # Panics
///
/// Panics if no run is active.
pub fn place_enemies(sim: &mut Simulation, offsets: &[(i32, i32)]) {
    let center = player_center(sim);
    let placed = offsets
        .iter()
        .map(|&(dx, dy)| {
            Enemy::spawn(Vec2Fixed::ZERO, false, &sim.config().enemy).with_center(center + point(dx, dy))
        })
        .collect();
    *sim.enemies_mut() = placed;
}

/// Player center.
///
/// # Panics
///
/// Panics if no run is active.
#[must_use]
pub fn player_center(sim: &Simulation) -> Vec2Fixed {
    sim.player().expect("run is active").body.center()
}

/// Input that does nothing.
#[must_use]
pub fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

/// Basic attack at a world point.
#[must_use]
pub fn attack_at(target: Vec2Fixed) -> InputSnapshot {
    InputSnapshot::aiming_at(target).with_attack()
}

/// Skill `slot` cast toward a world point.
#[must_use]
pub fn skill_at(slot: usize, target: Vec2Fixed) -> InputSnapshot {
    InputSnapshot::aiming_at(target).with_skill(slot)
}

/// Hold the given movement keys.
#[must_use]
pub fn walk(up: bool, down: bool, left: bool, right: bool) -> InputSnapshot {
    InputSnapshot {
        move_up: up,
        move_down: down,
        move_left: left,
        move_right: right,
        ..InputSnapshot::default()
    }
}

/// Feed the same input for `frames` frames, collecting events.
pub fn run_frames(sim: &mut Simulation, frames: usize, input: &InputSnapshot) -> Vec<FrameEvents> {
    (0..frames).map(|_| sim.update(frame_dt(), input)).collect()
}

/// Kill everything in the current room and step one frame.
pub fn clear_current_room(sim: &mut Simulation) -> FrameEvents {
    for enemy in sim.enemies_mut() {
        enemy.health.current = 0;
        enemy.alive = false;
    }
    if let Some(boss) = sim.boss_mut() {
        boss.core.health.current = 0;
        boss.core.alive = false;
    }
    sim.update(frame_dt(), &idle())
}

/// Clear rooms until the boss room is entered.
///
/// # Panics
///
/// Panics if the run ends before reaching the boss.
pub fn advance_to_boss_room(sim: &mut Simulation) {
    while sim.boss().is_none() {
        clear_current_room(sim);
        assert_eq!(sim.state(), RunState::InRun, "run ended before the boss room");
    }
}

/// Repositioning helper for enemies.
pub trait WithCenter {
    /// Move the body so its center sits on `center`.
    #[must_use]
    fn with_center(self, center: Vec2Fixed) -> Self;
}

impl WithCenter for Enemy {
    fn with_center(mut self, center: Vec2Fixed) -> Self {
        self.body = Body::centered_at(center, self.body.size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_centered() {
        assert_eq!(enemy_at(100, 50).body.center(), point(100, 50));
        assert!(elite_at(0, 0).elite);
        assert_eq!(boss_at(10, 10).core.body.center(), point(10, 10));
        assert_eq!(player_at(ClassKind::Caster, 5, 5).body.center(), point(5, 5));
    }

    #[test]
    fn test_place_enemies_relative_to_player() {
        let mut sim = started_run(ClassKind::Melee, 7);
        place_enemies(&mut sim, &[(40, 0), (0, -40)]);
        let center = player_center(&sim);
        assert_eq!(sim.enemies().len(), 2);
        assert_eq!(sim.enemies()[0].body.center(), center + point(40, 0));
        assert_eq!(sim.enemies()[1].body.center(), center + point(0, -40));
    }

    #[test]
    fn test_advance_to_boss_room() {
        let mut sim = started_run(ClassKind::Ranged, 11);
        advance_to_boss_room(&mut sim);
        assert!(sim.current_room().is_some_and(|room| room.is_boss()));
    }
}
