// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether `inner` lies entirely within this AABB. Shared edges count as inside.
    pub fn contains_aabb(&self, inner: &Self) -> bool {
        le(self.min_x, inner.min_x)
            && le(self.min_y, inner.min_y)
            && le(inner.max_x, self.max_x)
            && le(inner.max_y, self.max_y)
    }

    /// Whether two AABBs overlap. Touching edges count as overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        le(self.min_x, other.max_x)
            && le(other.min_x, self.max_x)
            && le(self.min_y, other.max_y)
            && le(other.min_y, self.max_y)
    }

    /// Return true if the AABB is empty or inverted (no area). Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y)
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create an AABB from its center and half-extents.
    pub fn from_center_extents(cx: T, cy: T, ex: T, ey: T) -> Self {
        Self {
            min_x: T::sub(cx, ex),
            min_y: T::sub(cy, ey),
            max_x: T::add(cx, ex),
            max_y: T::add(cy, ey),
        }
    }

    /// Center point `(x, y)`.
    pub fn center(&self) -> (T, T) {
        (T::mid(self.min_x, self.max_x), T::mid(self.min_y, self.max_y))
    }

    /// Half-widths `(x, y)`; zero for inverted axes.
    pub fn extents(&self) -> (T, T) {
        let (cx, cy) = self.center();
        (
            T::max_zero(T::sub(self.max_x, cx)),
            T::max_zero(T::sub(self.max_y, cy)),
        )
    }
}

/// Floating-point scalar abstraction for 2D AABBs stored in the tree.
///
/// Costs are always compared in `f64`, so `f32` coordinates are widened
/// before any area arithmetic.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Midpoint between a and b.
    fn mid(a: Self, b: Self) -> Self;

    /// Whether the value is neither infinite nor NaN.
    fn is_finite(v: Self) -> bool;

    /// Convert a scalar to `f64` for cost computations.
    fn widen(v: Self) -> f64;

    /// Convert an `f64` back to the scalar, rounding if needed.
    fn narrow(v: f64) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn is_finite(v: Self) -> bool {
        v.is_finite()
    }

    #[inline]
    fn widen(v: Self) -> f64 {
        v as f64
    }

    #[inline]
    fn narrow(v: f64) -> Self {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "f32 boxes accept the precision loss of storing f64 margins."
        )]
        let n = v as Self;
        n
    }
}

impl Scalar for f64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn is_finite(v: Self) -> bool {
        v.is_finite()
    }

    #[inline]
    fn widen(v: Self) -> f64 {
        v
    }

    #[inline]
    fn narrow(v: f64) -> Self {
        v
    }
}

/// Compute the area of an AABB in `f64`.
#[inline]
pub fn area<T: Scalar>(a: &Aabb2D<T>) -> f64 {
    let w = T::max_zero(T::sub(a.max_x, a.min_x));
    let h = T::max_zero(T::sub(a.max_y, a.min_y));
    T::widen(w) * T::widen(h)
}

/// Smallest AABB enclosing both inputs.
pub fn union_aabb<T: PartialOrd + Copy>(a: Aabb2D<T>, b: Aabb2D<T>) -> Aabb2D<T> {
    Aabb2D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}
pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_and_extents_round_trip() {
        let a = Aabb2D::<f64>::from_center_extents(2.0, 3.0, 1.0, 0.5);
        assert_eq!(a, Aabb2D::new(1.0, 2.5, 3.0, 3.5));
        assert_eq!(a.center(), (2.0, 3.0));
        assert_eq!(a.extents(), (1.0, 0.5));
    }

    #[test]
    fn overlap_is_inclusive_on_edges() {
        let a = Aabb2D::new(0.0, 0.0, 1.0, 1.0);
        let b = Aabb2D::new(1.0, 0.0, 2.0, 1.0);
        let c = Aabb2D::new(1.5, 0.0, 2.0, 1.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn contains_aabb_accepts_shared_edges() {
        let outer = Aabb2D::new(0.0_f32, 0.0, 4.0, 4.0);
        assert!(outer.contains_aabb(&Aabb2D::new(0.0, 0.0, 4.0, 2.0)));
        assert!(!outer.contains_aabb(&Aabb2D::new(-0.5, 0.0, 4.0, 2.0)));
    }

    #[test]
    fn union_and_area() {
        let u = union_aabb(Aabb2D::new(0.0, 0.0, 1.0, 1.0), Aabb2D::new(2.0, 2.0, 3.0, 4.0));
        assert_eq!(u, Aabb2D::new(0.0, 0.0, 3.0, 4.0));
        assert_eq!(area(&u), 12.0);
        // Inverted boxes have no area.
        assert_eq!(area(&Aabb2D::new(1.0, 1.0, 0.0, 0.0)), 0.0);
    }
}
