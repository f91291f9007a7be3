//! Shared entity building blocks: bounded resource pools and bodies.

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Rect, Vec2Fixed};

/// A bounded integer resource such as health or mana.
///
/// `current` never exceeds `max`; every mutation clamps instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pool {
    /// Current amount.
    pub current: u32,
    /// Maximum amount.
    pub max: u32,
}

impl Pool {
    /// Create a full pool.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the pool is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Check if the pool is at its maximum.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Check whether at least `amount` is available.
    #[must_use]
    pub const fn has(&self, amount: u32) -> bool {
        self.current >= amount
    }

    /// Remove up to `amount`, returning how much was actually removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    /// Add up to `amount`, returning how much was actually added.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let headroom = self.max.saturating_sub(self.current);
        let actual = amount.min(headroom);
        self.current += actual;
        actual
    }

    /// Refill to maximum.
    pub fn fill(&mut self) {
        self.current = self.max;
    }

    /// Change the maximum. The current amount is clamped down, never raised.
    pub fn set_max(&mut self, max: u32) {
        self.max = max;
        self.current = self.current.min(max);
    }

    /// Fill level in whole percent, floored. An empty pool reads 0.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            ((u64::from(self.current) * 100) / u64::from(self.max)) as u32
        }
    }
}

/// Square footprint of an entity, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner in world space.
    pub position: Vec2Fixed,
    /// Edge length.
    #[serde(with = "crate::math::fixed_serde")]
    pub size: Fixed,
}

impl Body {
    /// Create a body at a top-left position.
    #[must_use]
    pub const fn new(position: Vec2Fixed, size: Fixed) -> Self {
        Self { position, size }
    }

    /// Create a body whose center sits at `center`.
    #[must_use]
    pub fn centered_at(center: Vec2Fixed, size: Fixed) -> Self {
        let half = size / Fixed::from_num(2);
        Self::new(Vec2Fixed::new(center.x - half, center.y - half), size)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        self.rect().center()
    }

    /// Half the edge length, used as the collision radius.
    #[must_use]
    pub fn half_size(&self) -> Fixed {
        self.size / Fixed::from_num(2)
    }

    /// Bounding rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, Vec2Fixed::new(self.size, self.size))
    }

    /// Whether a world point lies on the body (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        self.rect().contains(point)
    }

    /// Keep the body fully inside `bounds`.
    pub fn clamp_into(&mut self, bounds: &Rect) {
        self.position = bounds.clamp_box(self.position, Vec2Fixed::new(self.size, self.size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_drain_floors_at_zero() {
        let mut health = Pool::new(50);
        assert_eq!(health.drain(20), 20);
        assert_eq!(health.drain(100), 30);
        assert_eq!(health.current, 0);
        assert!(health.is_empty());
    }

    #[test]
    fn test_pool_restore_caps_at_max() {
        let mut mana = Pool { current: 45, max: 50 };
        assert_eq!(mana.restore(10), 5);
        assert!(mana.is_full());
    }

    #[test]
    fn test_set_max_only_clamps_down() {
        let mut health = Pool { current: 120, max: 150 };
        health.set_max(100);
        assert_eq!(health.current, 100);

        health.set_max(200);
        assert_eq!(health.current, 100);
        assert_eq!(health.max, 200);
    }

    #[test]
    fn test_pool_percentage() {
        let pool = Pool { current: 329, max: 500 };
        assert_eq!(pool.percentage(), 65);
        assert_eq!(Pool { current: 0, max: 0 }.percentage(), 0);
    }

    #[test]
    fn test_body_center_and_contains() {
        let body = Body::new(Vec2Fixed::from_ints(100, 100), Fixed::from_num(30));
        assert_eq!(body.center(), Vec2Fixed::from_ints(115, 115));
        assert!(body.contains(Vec2Fixed::from_ints(130, 100)));
        assert!(!body.contains(Vec2Fixed::from_ints(131, 100)));
    }

    #[test]
    fn test_centered_at_roundtrips_center() {
        let body = Body::centered_at(Vec2Fixed::from_ints(300, 200), Fixed::from_num(40));
        assert_eq!(body.position, Vec2Fixed::from_ints(280, 180));
        assert_eq!(body.center(), Vec2Fixed::from_ints(300, 200));
    }

    #[test]
    fn test_clamp_into_room() {
        let room = Rect::new(Vec2Fixed::from_ints(0, 0), Vec2Fixed::from_ints(400, 300));
        let mut body = Body::new(Vec2Fixed::from_ints(-10, 290), Fixed::from_num(40));
        body.clamp_into(&room);
        assert_eq!(body.position, Vec2Fixed::from_ints(0, 260));
    }
}
