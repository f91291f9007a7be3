//! Camera follow. Published for the renderer; never feeds back into the
//! simulation.

use crate::config::CameraConfig;
use crate::math::{Fixed, Vec2Fixed};

/// Top-left offset that keeps `focus` centered in a viewport of
/// `viewport` size while staying inside `world`.
///
/// The clamp to zero runs first, so a world smaller than the viewport
/// yields a negative offset on that axis.
#[must_use]
pub fn follow(focus: Vec2Fixed, viewport: Vec2Fixed, world: Vec2Fixed) -> Vec2Fixed {
    let two = Fixed::from_num(2);
    let clamp_axis = |center: Fixed, view: Fixed, extent: Fixed| {
        let mut offset = center - view / two;
        if offset < Fixed::ZERO {
            offset = Fixed::ZERO;
        }
        if offset > extent - view {
            offset = extent - view;
        }
        offset
    };

    Vec2Fixed::new(
        clamp_axis(focus.x, viewport.x, world.x),
        clamp_axis(focus.y, viewport.y, world.y),
    )
}

/// Viewport size from config.
#[must_use]
pub fn viewport(config: &CameraConfig) -> Vec2Fixed {
    Vec2Fixed::new(
        Fixed::from_num(config.viewport_width),
        Fixed::from_num(config.viewport_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_clamps_to_world_edges() {
        let view = viewport(&CameraConfig::default());
        let world = Vec2Fixed::from_ints(5000, 1000);

        let start = follow(Vec2Fixed::from_ints(100, 100), view, world);
        assert_eq!(start, Vec2Fixed::from_ints(0, 0));

        let middle = follow(Vec2Fixed::from_ints(2000, 500), view, world);
        assert_eq!(middle, Vec2Fixed::from_ints(1200, 50));

        let end = follow(Vec2Fixed::from_ints(4990, 990), view, world);
        assert_eq!(end, Vec2Fixed::from_ints(3400, 100));
    }

    #[test]
    fn test_small_world_goes_negative() {
        let view = Vec2Fixed::from_ints(1600, 900);
        let world = Vec2Fixed::from_ints(800, 600);
        let offset = follow(Vec2Fixed::from_ints(400, 300), view, world);
        assert_eq!(offset, Vec2Fixed::from_ints(-800, -300));
    }
}
