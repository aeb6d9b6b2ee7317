// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding volume abstraction consumed by the tree.
//!
//! The tree never looks inside a box. Everything it needs (union, area, overlap,
//! containment, exact equality, and the in-place mutators used for fattening and
//! sweeping) goes through [`Volume`]. Implementations are provided for
//! [`Aabb2D<f32>`], [`Aabb2D<f64>`] and [`kurbo::Rect`].
//!
//! All implementations treat touching boxes as overlapping.

use core::fmt::Debug;

use kurbo::Rect;

use crate::types::{Aabb2D, Scalar, area, union_aabb};

/// A 2D axis-aligned bounding volume.
pub trait Volume: Copy + Debug {
    /// Smallest volume enclosing both `self` and `other`.
    fn combine(&self, other: &Self) -> Self;

    /// Area metric. Monotone under [`combine`](Self::combine).
    fn area(&self) -> f64;

    /// True if the volumes overlap, including touching edges.
    fn intersects(&self, other: &Self) -> bool;

    /// True if `inner` is fully enclosed by `self`.
    fn contains(&self, inner: &Self) -> bool;

    /// Exact geometric equality.
    fn equivalent(&self, other: &Self) -> bool;

    /// Translate in place.
    fn offset(&mut self, dx: f64, dy: f64);

    /// Multiply both half-extents by `factor`, keeping the center fixed.
    fn scale_extents(&mut self, factor: f64);

    /// Add `dx` and `dy` to the half-extents, keeping the center fixed.
    fn grow_extents(&mut self, dx: f64, dy: f64);

    /// True if every coordinate is finite and the volume is not inverted.
    fn is_well_formed(&self) -> bool;
}

impl<T: Scalar> Volume for Aabb2D<T> {
    #[inline]
    fn combine(&self, other: &Self) -> Self {
        union_aabb(*self, *other)
    }

    #[inline]
    fn area(&self) -> f64 {
        area(self)
    }

    #[inline]
    fn intersects(&self, other: &Self) -> bool {
        self.overlaps(other)
    }

    #[inline]
    fn contains(&self, inner: &Self) -> bool {
        self.contains_aabb(inner)
    }

    #[inline]
    fn equivalent(&self, other: &Self) -> bool {
        self == other
    }

    fn offset(&mut self, dx: f64, dy: f64) {
        let (dx, dy) = (T::narrow(dx), T::narrow(dy));
        self.min_x = T::add(self.min_x, dx);
        self.max_x = T::add(self.max_x, dx);
        self.min_y = T::add(self.min_y, dy);
        self.max_y = T::add(self.max_y, dy);
    }

    fn scale_extents(&mut self, factor: f64) {
        let (cx, cy) = self.center();
        let (ex, ey) = self.extents();
        *self = Self::from_center_extents(
            cx,
            cy,
            T::narrow(T::widen(ex) * factor),
            T::narrow(T::widen(ey) * factor),
        );
    }

    fn grow_extents(&mut self, dx: f64, dy: f64) {
        let (dx, dy) = (T::narrow(dx), T::narrow(dy));
        self.min_x = T::sub(self.min_x, dx);
        self.max_x = T::add(self.max_x, dx);
        self.min_y = T::sub(self.min_y, dy);
        self.max_y = T::add(self.max_y, dy);
    }

    fn is_well_formed(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .into_iter()
            .all(T::is_finite)
            && !self.is_empty()
    }
}

impl Volume for Rect {
    #[inline]
    fn combine(&self, other: &Self) -> Self {
        self.union(*other)
    }

    #[inline]
    fn area(&self) -> f64 {
        let w = (self.x1 - self.x0).max(0.0);
        let h = (self.y1 - self.y0).max(0.0);
        w * h
    }

    #[inline]
    fn intersects(&self, other: &Self) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    #[inline]
    fn contains(&self, inner: &Self) -> bool {
        self.x0 <= inner.x0 && self.y0 <= inner.y0 && inner.x1 <= self.x1 && inner.y1 <= self.y1
    }

    #[inline]
    fn equivalent(&self, other: &Self) -> bool {
        self == other
    }

    fn offset(&mut self, dx: f64, dy: f64) {
        self.x0 += dx;
        self.x1 += dx;
        self.y0 += dy;
        self.y1 += dy;
    }

    fn scale_extents(&mut self, factor: f64) {
        let (cx, cy) = (0.5 * (self.x0 + self.x1), 0.5 * (self.y0 + self.y1));
        let (ex, ey) = (0.5 * (self.x1 - self.x0), 0.5 * (self.y1 - self.y0));
        *self = Self::new(
            cx - ex * factor,
            cy - ey * factor,
            cx + ex * factor,
            cy + ey * factor,
        );
    }

    fn grow_extents(&mut self, dx: f64, dy: f64) {
        self.x0 -= dx;
        self.x1 += dx;
        self.y0 -= dy;
        self.y1 += dy;
    }

    fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .into_iter()
            .all(f64::is_finite)
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_scale_keeps_center() {
        let mut r = Rect::new(0.0, 0.0, 2.0, 4.0);
        r.scale_extents(1.5);
        assert_eq!(r, Rect::new(-0.5, -1.0, 2.5, 5.0));
    }

    #[test]
    fn rect_grow_then_contains_offset_copy() {
        let base = Rect::new(0.0, 0.0, 1.0, 1.0);
        let mut fat = base;
        fat.grow_extents(0.5, 0.25);
        let mut moved = base;
        Volume::offset(&mut moved, 0.5, -0.25);
        assert!(Volume::contains(&fat, &moved));
        Volume::offset(&mut moved, 0.1, 0.0);
        assert!(!Volume::contains(&fat, &moved));
    }

    #[test]
    fn aabb_and_rect_agree() {
        let a = Aabb2D::<f64>::new(1.0, 1.0, 3.0, 2.0);
        let b = Aabb2D::<f64>::new(2.0, 0.0, 5.0, 1.0);
        let ra = Rect::new(1.0, 1.0, 3.0, 2.0);
        let rb = Rect::new(2.0, 0.0, 5.0, 1.0);
        assert_eq!(Volume::area(&a.combine(&b)), Volume::area(&ra.combine(&rb)));
        assert_eq!(Volume::intersects(&a, &b), Volume::intersects(&ra, &rb));
        let mut sa = a;
        sa.scale_extents(1.2);
        let mut sr = ra;
        sr.scale_extents(1.2);
        assert_eq!(
            (sa.min_x, sa.min_y, sa.max_x, sa.max_y),
            (sr.x0, sr.y0, sr.x1, sr.y1)
        );
    }

    #[test]
    fn malformed_volumes_are_detected() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Rect::new(1.0, 0.0, 0.0, 1.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, f64::NAN, 1.0).is_well_formed());
        assert!(!Aabb2D::<f32>::new(0.0, 0.0, f32::INFINITY, 1.0).is_well_formed());
        assert!(Aabb2D::<f32>::new(0.0, 0.0, 0.0, 0.0).is_well_formed());
    }
}
