//! Per-frame input snapshot.
//!
//! The window layer polls devices and converts the cursor to world space;
//! the simulation only ever sees this read-only record.

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;
use crate::stats::StatKind;

/// Number of skill buttons.
pub const SKILL_SLOTS: usize = 4;

/// Everything the player asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Move up (−Y).
    pub move_up: bool,
    /// Move down (+Y).
    pub move_down: bool,
    /// Move left (−X).
    pub move_left: bool,
    /// Move right (+X).
    pub move_right: bool,
    /// Basic attack.
    pub attack: bool,
    /// Skill buttons, one per skill bar slot.
    pub skills: [bool; SKILL_SLOTS],
    /// Cursor position in world space.
    pub aim: Vec2Fixed,
    /// Stat point to spend while the level-up menu is open.
    pub allocate: Option<StatKind>,
}

impl InputSnapshot {
    /// Snapshot that only aims at `aim`.
    #[must_use]
    pub fn aiming_at(aim: Vec2Fixed) -> Self {
        Self {
            aim,
            ..Self::default()
        }
    }

    /// Press the attack button.
    #[must_use]
    pub fn with_attack(mut self) -> Self {
        self.attack = true;
        self
    }

    /// Press skill button `slot`. Out-of-range slots are ignored.
    #[must_use]
    pub fn with_skill(mut self, slot: usize) -> Self {
        if let Some(pressed) = self.skills.get_mut(slot) {
            *pressed = true;
        }
        self
    }

    /// Whether any movement flag is set.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.move_up || self.move_down || self.move_left || self.move_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let input = InputSnapshot::aiming_at(Vec2Fixed::from_ints(10, 20))
            .with_attack()
            .with_skill(2)
            .with_skill(9);
        assert!(input.attack);
        assert_eq!(input.skills, [false, false, true, false]);
        assert_eq!(input.aim, Vec2Fixed::from_ints(10, 20));
        assert!(!input.is_moving());
    }
}
