//! # Crawl Core
//!
//! Deterministic combat simulation core for a dungeon-crawler action RPG.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No windowing or device polling
//! - No unseeded randomness
//! - No floating-point math (uses fixed-point)
//!
//! The presentation layer hands [`simulation::Simulation::update`] one
//! [`input::InputSnapshot`] and a time delta per frame, then reads entity,
//! room and projectile state back for drawing.
//!
//! ## Crate Structure
//!
//! - [`stats`], [`items`], [`class`] - Attributes, equipment and archetypes
//! - [`effects`] - Timed status effects
//! - [`skills`], [`combat`] - Skill data, targeting and damage resolution
//! - [`player`], [`enemy`], [`boss`], [`projectile`] - Entity behaviors
//! - [`dungeon`] - Room generation and progression
//! - [`simulation`] - The per-frame run orchestrator
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod boss;
pub mod camera;
pub mod class;
pub mod combat;
pub mod components;
pub mod config;
pub mod dungeon;
pub mod effects;
pub mod enemy;
pub mod error;
pub mod input;
pub mod items;
pub mod math;
pub mod player;
pub mod projectile;
pub mod simulation;
pub mod skills;
pub mod stats;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::boss::{Boss, BossPhase};
    pub use crate::class::ClassKind;
    pub use crate::combat::{Combatant, DamageEvent, TargetHandle};
    pub use crate::components::{Body, Pool};
    pub use crate::config::GameConfig;
    pub use crate::dungeon::{Dungeon, Room, RoomKind};
    pub use crate::effects::{Effect, EffectKind, EffectSet};
    pub use crate::enemy::{Enemy, EnemyState};
    pub use crate::error::{GameError, Result};
    pub use crate::input::InputSnapshot;
    pub use crate::items::{Item, ItemSlot};
    pub use crate::math::{Fixed, Rect, Vec2Fixed};
    pub use crate::player::Player;
    pub use crate::projectile::{Projectile, ProjectileOwner};
    pub use crate::simulation::{FrameEvents, RunOutcome, RunState, Simulation};
    pub use crate::skills::{Skill, SkillKind};
    pub use crate::stats::{StatKind, Stats};
}
