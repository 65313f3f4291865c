//! Axis-aligned box overlap tests
//!
//! Every collidable in the arena is a box centered on its position. Entities
//! describe their extent either with an explicit width/height or a single
//! uniform size; explicit dimensions win per axis when both are present.

use glam::Vec2;

/// A centered axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    /// Box from explicit width/height
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            half: Vec2::new(width.abs() / 2.0, height.abs() / 2.0),
        }
    }

    /// Square box from a uniform size
    pub fn from_size(center: Vec2, size: f32) -> Self {
        Self::new(center, size, size)
    }

    /// Resolve a possibly partial description. Width/height take priority over
    /// `size` on each axis; a fully missing axis has zero extent.
    pub fn from_dims(center: Vec2, width: Option<f32>, height: Option<f32>, size: Option<f32>) -> Self {
        let w = width.or(size).unwrap_or(0.0);
        let h = height.or(size).unwrap_or(0.0);
        Self::new(center, w, h)
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    /// Strict overlap on both axes. Touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Same box scaled about its center
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            center: self.center,
            half: self.half * factor,
        }
    }
}

/// Anything that occupies a box in the arena
pub trait Collidable {
    fn bounds(&self) -> Aabb;
}

impl Collidable for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}

/// Overlap test between two collidables
#[inline]
pub fn check_collision<A: Collidable + ?Sized, B: Collidable + ?Sized>(a: &A, b: &B) -> bool {
    a.bounds().overlaps(&b.bounds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), 10.0, 10.0);
        let b = Aabb::new(Vec2::new(10.0, 0.0), 10.0, 10.0);
        assert!(!a.overlaps(&b));

        let c = Aabb::new(Vec2::new(9.9, 0.0), 10.0, 10.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_dimensions_take_priority_over_size() {
        let b = Aabb::from_dims(Vec2::ZERO, Some(4.0), None, Some(20.0));
        assert_eq!(b.half, Vec2::new(2.0, 10.0));

        let empty = Aabb::from_dims(Vec2::ZERO, None, None, None);
        assert_eq!(empty.half, Vec2::ZERO);
    }

    #[test]
    fn test_scaled_keeps_center() {
        let b = Aabb::new(Vec2::new(5.0, 5.0), 10.0, 20.0).scaled(0.5);
        assert_eq!(b.center, Vec2::new(5.0, 5.0));
        assert_eq!(b.half, Vec2::new(2.5, 5.0));
    }

    proptest! {
        #[test]
        fn prop_identical_boxes_collide(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 0.1f32..100.0,
            h in 0.1f32..100.0,
        ) {
            let a = Aabb::new(Vec2::new(x, y), w, h);
            prop_assert!(check_collision(&a, &a));
        }

        #[test]
        fn prop_disjoint_x_never_collides(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 0.1f32..100.0,
            h in 0.1f32..100.0,
            gap in 0.0f32..50.0,
            dy in -50.0f32..50.0,
        ) {
            let a = Aabb::new(Vec2::new(x, y), w, h);
            let b = Aabb::new(Vec2::new(x + w + gap + 1.0, y + dy), w, h);
            prop_assert!(!a.overlaps(&b));
            prop_assert!(!b.overlaps(&a));
        }

        #[test]
        fn prop_disjoint_y_never_collides(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 0.1f32..100.0,
            h in 0.1f32..100.0,
            gap in 0.0f32..50.0,
        ) {
            let a = Aabb::new(Vec2::new(x, y), w, h);
            let b = Aabb::new(Vec2::new(x, y - h - gap - 1.0), w, h);
            prop_assert!(!check_collision(&a, &b));
        }

        #[test]
        fn prop_overlap_is_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            aw in 0.1f32..50.0, ah in 0.1f32..50.0,
            bs in 0.1f32..50.0,
        ) {
            let a = Aabb::new(Vec2::new(ax, ay), aw, ah);
            let b = Aabb::from_size(Vec2::new(bx, by), bs);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
