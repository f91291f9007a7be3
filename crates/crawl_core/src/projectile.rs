//! Moving hazards fired by the player or the boss.

use crate::effects::Effect;
use crate::math::{Fixed, Rect, Vec2Fixed};
use crate::skills::SkillKind;

/// Who fired a projectile. Player bolts hit hostiles; boss bolts hit the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileOwner {
    /// Basic attacks and skills.
    Player,
    /// Boss ranged attack.
    Boss,
}

/// A bolt in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Projectile {
    /// Center point.
    pub position: Vec2Fixed,
    /// Units per second.
    pub velocity: Vec2Fixed,
    /// Damage on hit.
    pub damage: u32,
    /// Collision radius.
    pub radius: Fixed,
    /// Shooter.
    pub owner: ProjectileOwner,
    /// Skill that fired the bolt, `None` for basic attacks.
    pub skill: Option<SkillKind>,
    /// Effects applied to whatever the bolt hits.
    pub effects: Vec<Effect>,
    /// Cleared on hit or when leaving the room.
    pub alive: bool,
}

impl Projectile {
    /// Fire from `origin` along `direction` (expected normalized).
    #[must_use]
    pub fn new(
        origin: Vec2Fixed,
        direction: Vec2Fixed,
        speed: Fixed,
        damage: u32,
        radius: Fixed,
        owner: ProjectileOwner,
    ) -> Self {
        Self {
            position: origin,
            velocity: direction.scale(speed),
            damage,
            radius,
            owner,
            skill: None,
            effects: Vec::new(),
            alive: true,
        }
    }

    /// Fire from `origin` toward `target`.
    ///
    /// Returns `None` when both points coincide and no direction exists.
    #[must_use]
    pub fn aimed(
        origin: Vec2Fixed,
        target: Vec2Fixed,
        speed: Fixed,
        damage: u32,
        radius: Fixed,
        owner: ProjectileOwner,
    ) -> Option<Self> {
        if origin == target {
            return None;
        }
        let direction = (target - origin).normalize();
        Some(Self::new(origin, direction, speed, damage, radius, owner))
    }

    /// Tag the bolt with the skill that fired it and its on-hit effects.
    #[must_use]
    pub fn with_skill(mut self, skill: SkillKind, effects: &[Effect]) -> Self {
        self.skill = Some(skill);
        self.effects = effects.to_vec();
        self
    }

    /// Move by one frame of velocity.
    pub fn advance(&mut self, dt: Fixed) {
        self.position += self.velocity.scale(dt);
    }

    /// Whether the bolt touches a circle at `center` with `radius`.
    #[must_use]
    pub fn touches(&self, center: Vec2Fixed, radius: Fixed) -> bool {
        let reach = self.radius + radius;
        self.position.distance_squared(center) <= reach * reach
    }

    /// Whether the bolt center left `bounds`.
    #[must_use]
    pub fn escaped(&self, bounds: &Rect) -> bool {
        !bounds.contains(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ratio;

    fn bolt() -> Projectile {
        Projectile::aimed(
            Vec2Fixed::from_ints(0, 0),
            Vec2Fixed::from_ints(100, 0),
            Fixed::from_num(400),
            20,
            Fixed::from_num(5),
            ProjectileOwner::Player,
        )
        .expect("distinct points")
    }

    #[test]
    fn test_aimed_velocity() {
        assert_eq!(bolt().velocity, Vec2Fixed::from_ints(400, 0));
    }

    #[test]
    fn test_aimed_at_origin_is_none() {
        let origin = Vec2Fixed::from_ints(3, 3);
        let shot = Projectile::aimed(origin, origin, Fixed::ONE, 1, Fixed::ONE, ProjectileOwner::Boss);
        assert!(shot.is_none());
    }

    #[test]
    fn test_advance_and_touch() {
        let mut shot = bolt();
        shot.advance(ratio(1, 4));
        assert_eq!(shot.position, Vec2Fixed::from_ints(100, 0));
        assert!(shot.touches(Vec2Fixed::from_ints(120, 0), Fixed::from_num(15)));
        assert!(!shot.touches(Vec2Fixed::from_ints(121, 0), Fixed::from_num(15)));
    }

    #[test]
    fn test_escape_bounds() {
        let room = Rect::new(Vec2Fixed::ZERO, Vec2Fixed::from_ints(400, 300));
        let mut shot = bolt();
        shot.advance(Fixed::ONE);
        assert!(!shot.escaped(&room));
        shot.advance(ratio(1, 8));
        assert!(shot.escaped(&room));
    }
}
