//! The player character.

use crate::class::ClassKind;
use crate::combat::Combatant;
use crate::components::{Body, Pool};
use crate::config::PlayerConfig;
use crate::effects::EffectSet;
use crate::input::InputSnapshot;
use crate::items::{Equipment, Item};
use crate::math::{decay, floor_u32, millis, Fixed, Vec2Fixed};
use crate::skills::{class_skills, Skill};
use crate::stats::{derive_combat_stats, DerivedStats, StatKind, Stats};

/// Milliseconds the player flashes after taking a hit.
pub const HIT_FLASH_MS: u32 = 200;
/// Stat points granted per level.
pub const STAT_POINTS_PER_LEVEL: u32 = 3;
/// XP per level step: reaching level `n + 1` from `n` costs `n × XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u32 = 100;

/// Damage-absorbing shield fed from mana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ManaShield {
    /// Whether the shield is up.
    pub active: bool,
    /// Damage left to absorb.
    pub amount: u32,
}

impl ManaShield {
    /// Raise the shield with `amount` absorption.
    pub fn raise(&mut self, amount: u32) {
        self.active = true;
        self.amount = amount;
    }

    /// Soak up as much of `damage` as possible, returning what gets through.
    pub fn absorb(&mut self, damage: u32) -> u32 {
        if !self.active || self.amount == 0 {
            return damage;
        }
        if damage <= self.amount {
            self.amount -= damage;
            0
        } else {
            let through = damage - self.amount;
            self.amount = 0;
            self.active = false;
            through
        }
    }
}

/// Player state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    /// Archetype, fixed for the run.
    pub class: ClassKind,
    /// Footprint in world space.
    pub body: Body,
    /// Health.
    pub health: Pool,
    /// Mana.
    pub mana: Pool,
    /// Allocated attribute points (equipment not included).
    pub stats: Stats,
    /// Worn items.
    pub equipment: Equipment,
    /// Current level, starting at 1.
    pub level: u32,
    /// XP towards the next level.
    pub xp: u32,
    /// XP needed for the next level.
    pub xp_to_next: u32,
    /// Points waiting to be allocated.
    pub stat_points: u32,
    /// Skill bar.
    pub skills: Vec<Skill>,
    /// Mana shield.
    pub mana_shield: ManaShield,
    /// Active status effects.
    pub effects: EffectSet,
    /// Seconds of hit flash left.
    pub hit_flash: Fixed,
    mana_regen_per_second: u32,
    mana_regen_progress: Fixed,
}

impl Player {
    /// Create a level 1 player centered on `center`, at full health and mana.
    #[must_use]
    pub fn new(class: ClassKind, center: Vec2Fixed, config: &PlayerConfig) -> Self {
        let stats = Stats::starting();
        let equipment = Equipment::default();
        let derived = derive_combat_stats(&stats, &equipment);

        Self {
            class,
            body: Body::centered_at(center, Fixed::from_num(config.body_size)),
            health: Pool::new(derived.max_health),
            mana: Pool::new(derived.max_mana),
            stats,
            equipment,
            level: 1,
            xp: 0,
            xp_to_next: XP_PER_LEVEL,
            stat_points: 0,
            skills: class_skills(class),
            mana_shield: ManaShield::default(),
            effects: EffectSet::new(),
            hit_flash: Fixed::ZERO,
            mana_regen_per_second: config.mana_regen_per_second,
            mana_regen_progress: Fixed::ZERO,
        }
    }

    /// Combat values for the current points and equipment.
    #[must_use]
    pub fn derived(&self) -> DerivedStats {
        derive_combat_stats(&self.stats, &self.equipment)
    }

    /// Basic attack damage.
    #[must_use]
    pub fn attack_damage(&self) -> u32 {
        self.class.attack_damage(&self.derived())
    }

    /// Current move speed including status effects.
    #[must_use]
    pub fn move_speed(&self) -> Fixed {
        self.derived().move_speed * self.effects.speed_multiplier()
    }

    /// Recompute max health and mana, clamping current values down.
    pub fn refresh_stats(&mut self) {
        let derived = self.derived();
        self.health.set_max(derived.max_health);
        self.mana.set_max(derived.max_mana);
    }

    /// Equip an item, replacing whatever occupied its slot.
    ///
    /// Returns `false` and leaves equipment untouched when the item is
    /// restricted to another class.
    pub fn equip(&mut self, item: Item) -> bool {
        if !item.usable_by(self.class) {
            return false;
        }
        tracing::debug!(item = %item.name, slot = ?item.slot, "Equipped item");
        self.equipment.equip(item);
        self.refresh_stats();
        true
    }

    /// Spend one stat point on `kind`. No-op without points.
    pub fn allocate_stat(&mut self, kind: StatKind) -> bool {
        if self.stat_points == 0 {
            return false;
        }
        self.stats.add(kind, 1);
        self.stat_points -= 1;
        self.refresh_stats();
        true
    }

    /// Add XP, levelling up as many times as it covers.
    ///
    /// Returns the number of levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.stat_points += STAT_POINTS_PER_LEVEL;
            self.xp_to_next = self.level * XP_PER_LEVEL;
            gained += 1;
        }
        if gained > 0 {
            tracing::debug!(level = self.level, stat_points = self.stat_points, "Level up");
        }
        gained
    }

    /// Restore health, capped at max.
    pub fn heal(&mut self, amount: u32) -> u32 {
        self.health.restore(amount)
    }

    /// Move along the input's direction flags for one frame.
    pub fn apply_movement(&mut self, input: &InputSnapshot, dt: Fixed) {
        let step = self.move_speed() * dt;
        if step == Fixed::ZERO {
            return;
        }
        let position = &mut self.body.position;
        if input.move_up {
            position.y -= step;
        }
        if input.move_down {
            position.y += step;
        }
        if input.move_left {
            position.x -= step;
        }
        if input.move_right {
            position.x += step;
        }
    }

    /// Per-frame upkeep: flash timer, skill cooldowns, mana regen and
    /// effect ticks.
    pub fn update(&mut self, dt: Fixed) {
        self.hit_flash = decay(self.hit_flash, dt);

        for skill in &mut self.skills {
            skill.tick(dt);
        }

        if self.mana.is_full() {
            self.mana_regen_progress = Fixed::ZERO;
        } else {
            self.mana_regen_progress += dt * Fixed::from_num(self.mana_regen_per_second);
            let whole = floor_u32(self.mana_regen_progress);
            if whole > 0 {
                self.mana.restore(whole);
                self.mana_regen_progress -= Fixed::from_num(whole);
            }
        }

        let mut periodic = Vec::new();
        self.effects.tick(dt, |_, amount| periodic.push(amount));
        for amount in periodic {
            Combatant::take_damage(self, amount);
        }
    }
}

impl Combatant for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn is_alive(&self) -> bool {
        !self.health.is_empty()
    }

    /// Damage reduction applies first, then the mana shield soaks what it
    /// can before health is reduced.
    fn take_damage(&mut self, amount: u32) -> u32 {
        let reduced = self.effects.reduce_incoming(amount);
        let through = self.mana_shield.absorb(reduced);
        self.hit_flash = millis(HIT_FLASH_MS);
        self.health.drain(through)
    }

    fn effects(&self) -> &EffectSet {
        &self.effects
    }

    fn effects_mut(&mut self) -> &mut EffectSet {
        &mut self.effects
    }
}
