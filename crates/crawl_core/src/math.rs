//! Fixed-point math utilities for deterministic simulation.
//!
//! All simulation state uses fixed-point arithmetic so that a run driven
//! by the same seed and the same input snapshots replays bit-for-bit on
//! every platform.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Component size above which [`Vec2Fixed::normalize`] rescales first.
const NORMALIZE_LIMIT: i32 = 1 << 14;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Build a fixed-point value from a ratio of integers.
///
/// Dyadic ratios (halves, quarters) are exact; use them for tuning data
/// that gets multiplied and floored.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// Convert whole milliseconds to fixed-point seconds.
#[must_use]
pub fn millis(ms: u32) -> Fixed {
    Fixed::from_num(ms) / Fixed::from_num(1000)
}

/// Floor a non-negative fixed-point value to an unsigned integer.
///
/// Negative inputs floor to zero.
#[must_use]
pub fn floor_u32(value: Fixed) -> u32 {
    if value <= Fixed::ZERO {
        0
    } else {
        value.to_num::<u32>()
    }
}

/// Move a countdown timer towards zero, never below it.
#[must_use]
pub fn decay(timer: Fixed, dt: Fixed) -> Fixed {
    if timer > Fixed::ZERO {
        (timer - dt).max(Fixed::ZERO)
    } else {
        timer
    }
}

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer coordinates.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    ///
    /// Saturates at [`Fixed::MAX`], which still compares greater than any
    /// configured range squared.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x.saturating_sub(other.x);
        let dy = self.y.saturating_sub(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Length of the vector.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.dot(self))
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x
            .saturating_mul(other.x)
            .saturating_add(self.y.saturating_mul(other.y))
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        // halve long vectors until the squared length fits
        let limit = Fixed::from_num(NORMALIZE_LIMIT);
        let two = Fixed::from_num(2);
        let mut v = self;
        while v.x > limit || v.x < -limit || v.y > limit || v.y < -limit {
            v = Self::new(v.x / two, v.y / two);
        }

        let len_sq = v.dot(v);

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(v.x / len, v.y / len)
    }

    /// Point `distance` units from `self` towards `target`.
    ///
    /// Returns `self` unchanged when both points coincide.
    #[must_use]
    pub fn step_towards(self, target: Self, distance: Fixed) -> Self {
        let direction = (target - self).normalize();
        self + direction.scale(distance)
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..48 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Unit vector pointing `index / count` of a full turn from the +X axis.
///
/// Quarter turns are exact; other angles use a fixed-point Taylor series
/// so that results do not depend on the platform's float library.
#[must_use]
pub fn turn_direction(index: u32, count: u32) -> Vec2Fixed {
    if count == 0 {
        return Vec2Fixed::new(Fixed::ONE, Fixed::ZERO);
    }
    let index = index % count;
    if (index * 4) % count == 0 {
        return match index * 4 / count {
            0 => Vec2Fixed::from_ints(1, 0),
            1 => Vec2Fixed::from_ints(0, 1),
            2 => Vec2Fixed::from_ints(-1, 0),
            _ => Vec2Fixed::from_ints(0, -1),
        };
    }

    let pi = Fixed::from_num(fixed::consts::PI);
    let tau = pi * Fixed::from_num(2);
    let mut angle = tau * Fixed::from_num(index) / Fixed::from_num(count);
    if angle > pi {
        angle -= tau;
    }
    let (sin, cos) = sin_cos(angle);
    Vec2Fixed::new(cos, sin)
}

/// Sine and cosine of an angle in `[-π, π]` by Taylor expansion.
fn sin_cos(angle: Fixed) -> (Fixed, Fixed) {
    let x_sq = angle * angle;
    let mut sin = Fixed::ZERO;
    let mut cos = Fixed::ZERO;
    let mut sin_term = angle;
    let mut cos_term = Fixed::ONE;

    for n in 0..12 {
        sin += sin_term;
        cos += cos_term;
        let k = Fixed::from_num(2 * n + 2);
        sin_term = -sin_term * x_sq / (k * (k + Fixed::ONE));
        cos_term = -cos_term * x_sq / ((k - Fixed::ONE) * k);
    }

    (sin, cos)
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::AddAssign for Vec2Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Neg for Vec2Fixed {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Vec2Fixed,
    /// Width and height.
    pub size: Vec2Fixed,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2Fixed, size: Vec2Fixed) -> Self {
        Self { origin, size }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> Fixed {
        self.origin.x + self.size.x
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> Fixed {
        self.origin.y + self.size.y
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        let two = Fixed::from_num(2);
        Vec2Fixed::new(
            self.origin.x + self.size.x / two,
            self.origin.y + self.size.y / two,
        )
    }

    /// Whether `point` lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        point.x >= self.origin.x
            && point.x <= self.right()
            && point.y >= self.origin.y
            && point.y <= self.bottom()
    }

    /// Clamp a box of `size` with top-left `position` so it stays inside.
    ///
    /// The far-edge clamp runs last, so a box larger than the rectangle
    /// ends up aligned to the right/bottom edge.
    #[must_use]
    pub fn clamp_box(&self, position: Vec2Fixed, size: Vec2Fixed) -> Vec2Fixed {
        let mut clamped = position;
        if clamped.x < self.origin.x {
            clamped.x = self.origin.x;
        }
        if clamped.x + size.x > self.right() {
            clamped.x = self.right() - size.x;
        }
        if clamped.y < self.origin.y {
            clamped.y = self.origin.y;
        }
        if clamped.y + size.y > self.bottom() {
            clamped.y = self.bottom() - size.y;
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::from_ints(3, 0);
        let b = Vec2Fixed::from_ints(0, 4);
        // 3² + 4² = 25
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
    }

    #[test]
    fn test_distance_is_exact_for_integer_triangles() {
        let a = Vec2Fixed::from_ints(0, 0);
        let b = Vec2Fixed::from_ints(30, 40);
        assert_eq!(a.distance(b), Fixed::from_num(50));
    }

    #[test]
    fn test_vec2_normalize() {
        let norm = Vec2Fixed::from_ints(3, 4).normalize();
        let len_sq = norm.dot(norm);
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!(
            (len_sq - Fixed::ONE).abs() < epsilon,
            "normalized vector length² should be ~1, got {:?}",
            len_sq
        );
    }

    #[test]
    fn test_distance_squared_saturates() {
        let far = Vec2Fixed::new(Fixed::MAX, Fixed::MAX);
        let near = Vec2Fixed::new(Fixed::MIN, Fixed::ZERO);
        assert_eq!(far.distance_squared(near), Fixed::MAX);
    }

    #[test]
    fn test_normalize_far_vector() {
        let epsilon = Fixed::ONE / Fixed::from_num(1000);
        let norm = Vec2Fixed::new(Fixed::from_num(-2_000_000_000), Fixed::ZERO).normalize();
        assert!((norm.x + Fixed::ONE).abs() < epsilon);
        assert_eq!(norm.y, Fixed::ZERO);

        let diagonal = Vec2Fixed::from_ints(1_000_000, 1_000_000).normalize();
        assert!((diagonal.dot(diagonal) - Fixed::ONE).abs() < epsilon);
        assert_eq!(diagonal.x, diagonal.y);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec2Fixed::ZERO.normalize(), Vec2Fixed::ZERO);
    }

    #[test]
    fn test_step_towards() {
        let from = Vec2Fixed::from_ints(0, 0);
        let to = Vec2Fixed::from_ints(10, 0);
        let moved = from.step_towards(to, Fixed::from_num(4));
        assert_eq!(moved, Vec2Fixed::from_ints(4, 0));
    }

    #[test]
    fn test_ratio_and_millis() {
        assert_eq!(ratio(3, 2), Fixed::from_num(1.5));
        assert_eq!(millis(500), Fixed::from_num(0.5));
    }

    #[test]
    fn test_floor_u32() {
        assert_eq!(floor_u32(Fixed::from_num(4.75)), 4);
        assert_eq!(floor_u32(Fixed::from_num(-3)), 0);
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let timer = millis(150);
        assert_eq!(decay(timer, millis(100)), millis(150) - millis(100));
        assert_eq!(decay(timer, Fixed::ONE), Fixed::ZERO);
        assert_eq!(decay(Fixed::ZERO, Fixed::ONE), Fixed::ZERO);
    }

    #[test]
    fn test_turn_direction_quarter_turns_are_exact() {
        assert_eq!(turn_direction(0, 2), Vec2Fixed::from_ints(1, 0));
        assert_eq!(turn_direction(1, 2), Vec2Fixed::from_ints(-1, 0));
        assert_eq!(turn_direction(3, 4), Vec2Fixed::from_ints(0, -1));
    }

    #[test]
    fn test_turn_direction_general_angle() {
        // a third of a turn: (-0.5, 0.866...)
        let dir = turn_direction(1, 3);
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!((dir.x + ratio(1, 2)).abs() < epsilon);
        assert!((dir.dot(dir) - Fixed::ONE).abs() < epsilon);
    }

    #[test]
    fn test_rect_contains_and_clamp() {
        let room = Rect::new(Vec2Fixed::from_ints(0, 0), Vec2Fixed::from_ints(400, 300));
        assert!(room.contains(Vec2Fixed::from_ints(400, 300)));
        assert!(!room.contains(Vec2Fixed::from_ints(401, 10)));

        let size = Vec2Fixed::from_ints(40, 40);
        let clamped = room.clamp_box(Vec2Fixed::from_ints(390, -5), size);
        assert_eq!(clamped, Vec2Fixed::from_ints(360, 0));
        assert_eq!(room.center(), Vec2Fixed::from_ints(200, 150));
    }
}
