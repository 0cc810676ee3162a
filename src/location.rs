//! Screen points and rectangles

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on screen. Coordinates may be negative while offsets are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by a pixel delta
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Center point, the default anchor for actions on a match
    pub fn center(&self) -> Location {
        let clamp = |v: u64| v.min(i32::MAX as u64) as i32;
        Location::new(
            clamp(self.x as u64 + (self.width / 2) as u64),
            clamp(self.y as u64 + (self.height / 2) as u64),
        )
    }

    /// Check if `other` lies completely inside this box
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Area shared by both boxes, zero when they do not touch
    pub fn intersection_area(&self, other: &BoundingBox) -> u64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return 0;
        }
        (right - left) as u64 * (bottom - top) as u64
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.intersection_area(other) > 0
    }

    /// Translate by a non-negative origin, e.g. from region to screen coordinates
    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_offset() {
        let bbox = BoundingBox::new(350, 250, 100, 100);
        assert_eq!(bbox.center(), Location::new(400, 300));
        assert_eq!(bbox.center().offset(200, 100), Location::new(600, 400));
        assert_eq!(bbox.center().offset(-50, -30), Location::new(350, 270));
    }

    #[test]
    fn test_contains() {
        let outer = BoundingBox::new(0, 0, 100, 100);
        assert!(outer.contains(&BoundingBox::new(90, 90, 10, 10)));
        assert!(!outer.contains(&BoundingBox::new(95, 90, 10, 10)));
    }

    #[test]
    fn test_intersection() {
        let a = BoundingBox::new(0, 0, 10, 10);
        assert_eq!(a.intersection_area(&BoundingBox::new(5, 5, 10, 10)), 25);
        // Touching edges do not overlap
        assert!(!a.intersects(&BoundingBox::new(10, 0, 10, 10)));
    }

    #[test]
    fn test_extreme_values_saturate() {
        let far = Location::new(i32::MAX - 5, i32::MIN + 5);
        assert_eq!(far.offset(100, -100), Location::new(i32::MAX, i32::MIN));

        let huge = BoundingBox::new(u32::MAX - 10, u32::MAX - 10, 100, 100);
        assert_eq!(huge.right(), u32::MAX);
        assert_eq!(huge.bottom(), u32::MAX);
        assert_eq!(huge.center(), Location::new(i32::MAX, i32::MAX));
        assert_eq!(huge.translate(50, 50).x, u32::MAX);
        assert!(!BoundingBox::new(0, 0, 100, 100).contains(&huge));
        assert!(huge.intersects(&BoundingBox::new(u32::MAX - 5, u32::MAX - 5, 3, 3)));
    }
}
