use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};

/// A region of the continuous plane used for containment queries.
///
/// Rectangles are half-open, `min` is inside and `max` is outside, matching
/// how integer cells cover the plane.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    Rect { min: Vec2, max: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

use Area::*;

impl Area {
    /// Rectangle from origin and size.
    pub fn sized(origin: Vec2, size: Vec2) -> Self {
        Rect {
            min: origin,
            max: origin + size,
        }
    }

    /// Circle around a point.
    pub fn around(center: Vec2, radius: f32) -> Self {
        Circle { center, radius }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        match *self {
            Rect { min, max } => {
                p.x >= min.x && p.y >= min.y && p.x < max.x && p.y < max.y
            }
            Circle { center, radius } => {
                center.distance_squared(p) <= radius * radius
            }
        }
    }

    pub fn center(&self) -> Vec2 {
        match *self {
            Rect { min, max } => (min + max) / 2.0,
            Circle { center, .. } => center,
        }
    }

    /// Smallest rectangle containing the area.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        match *self {
            Rect { min, max } => (min, max),
            Circle { center, radius } => {
                (center - vec2(radius, radius), center + vec2(radius, radius))
            }
        }
    }

    /// Pull a point inside the rectangle bounds of the area.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        let (min, max) = self.bounds();
        // Stay strictly below the half-open upper edge.
        let max = max - Vec2::splat(1e-3);
        p.clamp(min, max.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment() {
        let r = Area::sized(Vec2::ZERO, vec2(10.0, 10.0));
        assert!(r.contains(vec2(0.0, 0.0)));
        assert!(r.contains(vec2(9.99, 5.0)));
        assert!(!r.contains(vec2(10.0, 5.0)));
        assert!(!r.contains(vec2(-0.1, 5.0)));

        let c = Area::around(vec2(5.0, 5.0), 2.0);
        assert!(c.contains(vec2(7.0, 5.0)));
        assert!(!c.contains(vec2(7.0, 7.0)));
    }

    #[test]
    fn clamping() {
        let r = Area::sized(Vec2::ZERO, vec2(10.0, 10.0));
        let p = r.clamp(vec2(-5.0, 20.0));
        assert_eq!(p.x, 0.0);
        assert!(p.y < 10.0);
        assert!(r.contains(p));
    }
}
