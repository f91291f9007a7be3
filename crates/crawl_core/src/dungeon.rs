//! Dungeon layout and room progression.
//!
//! A dungeon is a left-to-right strip of normal rooms followed by one
//! boss room. It is generated once per run from the simulation's seeded
//! RNG and never regenerated mid-run; only the current-room index moves.

use rand::Rng;

use crate::boss::Boss;
use crate::config::DungeonConfig;
use crate::enemy::Enemy;
use crate::math::{Fixed, Rect, Vec2Fixed};

/// Room type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKind {
    /// Regular enemies placed at generation time.
    Normal,
    /// Fixed size; the boss spawns on entry.
    Boss,
}

/// Where an enemy appears when the room is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnemySpawn {
    /// Top-left corner of the enemy body.
    pub position: Vec2Fixed,
    /// Elite tier.
    pub elite: bool,
}

/// One room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Room {
    /// World-space bounds.
    pub bounds: Rect,
    /// Normal or boss room.
    pub kind: RoomKind,
    /// Enemy placements (empty for the boss room).
    pub spawns: Vec<EnemySpawn>,
    /// Set once, when every hostile in the room is dead.
    pub completed: bool,
}

impl Room {
    /// Generate a room with its top-left corner at `origin`.
    pub fn generate<R: Rng + ?Sized>(origin: Vec2Fixed, kind: RoomKind, config: &DungeonConfig, rng: &mut R) -> Self {
        let (width, height) = match kind {
            RoomKind::Boss => (config.boss_room_width, config.boss_room_height),
            RoomKind::Normal => (
                rng.gen_range(config.room_width.min..=config.room_width.max),
                rng.gen_range(config.room_height.min..=config.room_height.max),
            ),
        };

        let mut spawns = Vec::new();
        if kind == RoomKind::Normal {
            let count = rng.gen_range(config.enemies_per_room.min..=config.enemies_per_room.max);
            let span_x = width.saturating_sub(config.spawn_margin);
            let span_y = height.saturating_sub(config.spawn_margin);
            for i in 0..count {
                let offset = Vec2Fixed::new(
                    Fixed::from_num(rng.gen_range(0..=span_x)),
                    Fixed::from_num(rng.gen_range(0..=span_y)),
                );
                spawns.push(EnemySpawn {
                    position: origin + offset,
                    elite: i + 1 == count,
                });
            }
        }

        Self {
            bounds: Rect::new(origin, Vec2Fixed::new(Fixed::from_num(width), Fixed::from_num(height))),
            kind,
            spawns,
            completed: false,
        }
    }

    /// Whether this is the boss room.
    #[must_use]
    pub fn is_boss(&self) -> bool {
        self.kind == RoomKind::Boss
    }

    /// Whether every hostile is down.
    ///
    /// A normal room is clear when no enemy is alive. The boss room is
    /// clear only once a boss exists and is dead.
    #[must_use]
    pub fn is_cleared(&self, enemies: &[Enemy], boss: Option<&Boss>) -> bool {
        match self.kind {
            RoomKind::Normal => enemies.iter().all(|enemy| !enemy.alive),
            RoomKind::Boss => boss.is_some_and(|boss| !boss.core.alive),
        }
    }
}

/// The run's room sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dungeon {
    rooms: Vec<Room>,
    current: usize,
}

impl Dungeon {
    /// Generate `normal_rooms` normal rooms and a boss room, spaced by the
    /// widest normal room plus the configured gap.
    ///
    /// The boss room comes last, so it may be wider than the spacing.
    pub fn generate<R: Rng + ?Sized>(config: &DungeonConfig, rng: &mut R) -> Self {
        let spacing = Fixed::from_num(config.room_width.max.saturating_add(config.room_gap));
        let mut origin = Vec2Fixed::ZERO;
        let mut rooms = Vec::with_capacity(config.normal_rooms + 1);

        for _ in 0..config.normal_rooms {
            rooms.push(Room::generate(origin, RoomKind::Normal, config, rng));
            origin.x += spacing;
        }
        rooms.push(Room::generate(origin, RoomKind::Boss, config, rng));

        Self { rooms, current: 0 }
    }

    /// Every room in order.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Index of the current room.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The room the player is in, `None` once the index has run past the end.
    #[must_use]
    pub fn current_room(&self) -> Option<&Room> {
        self.rooms.get(self.current)
    }

    /// Mark the current room completed. Later calls are no-ops.
    pub fn complete_current(&mut self) {
        if let Some(room) = self.rooms.get_mut(self.current) {
            room.completed = true;
        }
    }

    /// Move to the next room.
    ///
    /// Returns the new room, or `None` when the last room has been left.
    pub fn advance(&mut self) -> Option<&Room> {
        if self.current < self.rooms.len() {
            self.current += 1;
        }
        self.rooms.get(self.current)
    }

    /// Far corner of the union of all rooms.
    #[must_use]
    pub fn world_bounds(&self) -> Vec2Fixed {
        self.rooms.iter().fold(Vec2Fixed::ZERO, |extent, room| {
            Vec2Fixed::new(extent.x.max(room.bounds.right()), extent.y.max(room.bounds.bottom()))
        })
    }

    /// Number of rooms completed so far.
    #[must_use]
    pub fn rooms_cleared(&self) -> usize {
        self.rooms.iter().filter(|room| room.completed).count()
    }
}
