//! Axis-aligned rectangles for hitboxes and movement bounds
//!
//! Screen space: x grows right, y grows down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box given by its min (top-left) and max (bottom-right) corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of the given size centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap test; boxes that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Nearest point inside the box
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center() {
        let r = Rect::from_center(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0));
        assert_eq!(r.min, Vec2::new(90.0, 45.0));
        assert_eq!(r.max, Vec2::new(110.0, 55.0));
        assert_eq!(r.center(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_overlap() {
        let a = Rect::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::from_center(Vec2::new(8.0, 8.0), Vec2::splat(10.0));
        let c = Rect::from_center(Vec2::new(30.0, 0.0), Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_clamp_point() {
        let bounds = Rect::new(Vec2::new(10.0, 300.0), Vec2::new(790.0, 590.0));
        assert_eq!(bounds.clamp_point(Vec2::new(-50.0, 0.0)), Vec2::new(10.0, 300.0));
        assert_eq!(bounds.clamp_point(Vec2::new(400.0, 400.0)), Vec2::new(400.0, 400.0));
        assert_eq!(bounds.clamp_point(Vec2::new(900.0, 900.0)), Vec2::new(790.0, 590.0));
        assert!(bounds.contains(bounds.clamp_point(Vec2::new(-1e6, 1e6))));
    }

    #[test]
    fn test_new_normalizes_corners() {
        let r = Rect::new(Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert_eq!(r.min, Vec2::ZERO);
        assert_eq!(r.width(), 10.0);
        assert_eq!(r.height(), 10.0);
    }
}
