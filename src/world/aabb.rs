use crate::geometry::RaySegment;
use crate::math::{Scalar, VecN};
use std::ops::Add;

// ─── Axis-Aligned Bounding Box ──────────────────────────────────────────────

/// An axis-aligned box in `N` dimensions, the bounding volume of the BVH.
/// Intersection uses the slab method: the ray's parameter interval is
/// clipped against every axis and the box is hit iff the interval stays
/// non-empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<const N: usize> {
    min: VecN<N>,
    max: VecN<N>,
}

impl<const N: usize> Aabb<N> {
    /// Builds the box spanned by two arbitrary opposite corners; the
    /// coordinates are sorted per axis.
    pub fn new(corner_a: VecN<N>, corner_b: VecN<N>) -> Self {
        Self {
            min: corner_a.zip_with(corner_b, Scalar::min),
            max: corner_a.zip_with(corner_b, Scalar::max),
        }
    }

    #[inline(always)]
    pub fn min(&self) -> VecN<N> {
        self.min
    }

    #[inline(always)]
    pub fn max(&self) -> VecN<N> {
        self.max
    }

    /// Smallest box enclosing both operands — used bottom-up during BVH
    /// construction.
    pub fn surrounding(a: &Self, b: &Self) -> Self {
        Self {
            min: a.min.zip_with(b.min, Scalar::min),
            max: a.max.zip_with(b.max, Scalar::max),
        }
    }

    /// Index of the axis with the largest extent — the split dimension for
    /// top-down BVH construction.
    pub fn largest_extent_axis(&self) -> usize {
        let mut axis = 0;
        let mut extent = self.max[0] - self.min[0];
        for k in 1..N {
            let e = self.max[k] - self.min[k];
            if e > extent {
                extent = e;
                axis = k;
            }
        }
        axis
    }

    /// Slab-method intersection test against `[t_min, t_max]`. Axes with a
    /// zero direction component degenerate to a containment check of the
    /// start coordinate; any NaN in the interval arithmetic reads as no-hit.
    pub fn hit(&self, segment: &RaySegment<N>, t_min: Scalar, t_max: Scalar) -> bool {
        let mut t_min = t_min;
        let mut t_max = t_max;
        for axis in 0..N {
            let direction = segment.direction[axis];
            let start = segment.start[axis];
            if direction == 0.0 {
                if start < self.min[axis] || start > self.max[axis] {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let mut t0 = (self.min[axis] - start) * inv;
            let mut t1 = (self.max[axis] - start) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            // note: a NaN comparison is false, so NaN collapses to no-hit
            if !(t_min <= t_max) {
                return false;
            }
        }
        true
    }
}

/// Translates the box.
impl<const N: usize> Add<VecN<N>> for Aabb<N> {
    type Output = Self;

    fn add(self, offset: VecN<N>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
