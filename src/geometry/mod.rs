//! Manifold geometries and geodesic ray integration.
//!
//! A [`Geometry`] turns a starting point and a tangent direction into a
//! [`ManifoldRay`]: a lazy sequence of straight [`RaySegment`]s that
//! piecewise approximate the geodesic through that point. Flat geometries
//! emit a single infinite segment; curved geometries integrate the geodesic
//! equation with an adaptive Runge–Kutta stepper.

mod euclidean;
mod geodesic;
mod minkowski;
mod schwarzschild;
mod stepper;
mod swirl;
mod twisted_orb;

pub use euclidean::{Euclidean, Euclidean3};
pub use geodesic::{CurvedGeometry, GeodesicRay, RayIntegration};
pub use minkowski::Minkowski;
pub use schwarzschild::Schwarzschild;
pub use swirl::Swirl;
pub use twisted_orb::TwistedOrb;

use crate::math::{Mat, Scalar, VecN, INFINITY};

// ─── Ray Segment ────────────────────────────────────────────────────────────

/// A straight piece of a (possibly curved) light ray: the unit of
/// integration and of intersection testing. `t_max` bounds the parameter
/// range for which the segment approximates the underlying geodesic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment<const N: usize> {
    pub start: VecN<N>,
    pub direction: VecN<N>,
    pub t_max: Scalar,
}

impl<const N: usize> RaySegment<N> {
    #[inline(always)]
    pub const fn new(start: VecN<N>, direction: VecN<N>, t_max: Scalar) -> Self {
        Self {
            start,
            direction,
            t_max,
        }
    }

    /// Segment of unbounded extent — flat geometries produce exactly one of
    /// these per ray.
    #[inline(always)]
    pub const fn unbounded(start: VecN<N>, direction: VecN<N>) -> Self {
        Self::new(start, direction, INFINITY)
    }

    /// Evaluates the segment at parameter `t`:
    /// `at(t) = start + t · direction`.
    #[inline(always)]
    pub fn at(&self, t: Scalar) -> VecN<N> {
        self.start + self.direction * t
    }

    /// True iff `t` lies within this segment's valid parameter range.
    #[inline(always)]
    pub fn contains(&self, t: Scalar) -> bool {
        t < self.t_max
    }

    #[inline(always)]
    pub fn direction_near_zero(&self, epsilon: Scalar) -> bool {
        self.direction.near_zero(epsilon)
    }
}

// ─── Ray and Geometry Interfaces ────────────────────────────────────────────

/// A light ray on a manifold, approximated by straight segments.
pub trait ManifoldRay<const N: usize> {
    /// Returns the next segment, or `None` when the ray ends — because the
    /// geometry delivered its single flat segment already, the maximum
    /// integration length was exceeded, or the integration ran into
    /// numerical trouble.
    fn next_ray_segment(&mut self) -> Option<RaySegment<N>>;
}

/// A manifold with enough structure to trace light through it: it emits
/// rays, measures tangent vectors via its metric, and maps between the
/// tangent space and a local 3D orthonormal basis in which shading happens.
pub trait Geometry<const N: usize>: Send + Sync {
    /// Ray starting at `start` in the tangent direction `direction`.
    /// The direction is expected to be normalized with respect to the local
    /// metric by the caller.
    fn ray_from<'a>(
        &'a self,
        start: VecN<N>,
        direction: VecN<N>,
    ) -> Box<dyn ManifoldRay<N> + 'a>;

    /// Ray from `start` whose geodesic passes through `target`. Flat
    /// geometries return the straight connecting ray; curved geometries may
    /// solve an analytic inverse or approximate.
    fn ray_passing_through<'a>(
        &'a self,
        start: VecN<N>,
        target: VecN<N>,
    ) -> Box<dyn ManifoldRay<N> + 'a>;

    /// Jacobian converting tangent vectors at `position` into the local 3D
    /// orthonormal basis.
    fn to_onb_jacobian(&self, position: VecN<N>) -> Mat<3, N>;

    /// Jacobian converting local orthonormal 3D vectors back into tangent
    /// vectors at `position`. Mutual pseudo-inverse of
    /// [`Geometry::to_onb_jacobian`] on its image.
    fn from_onb_jacobian(&self, position: VecN<N>) -> Mat<N, 3>;

    /// The local metric tensor at `position`.
    fn metric(&self, position: VecN<N>) -> Mat<N, N>;

    /// Normalizes a tangent vector with respect to the local metric.
    fn normalize(&self, position: VecN<N>, vec: VecN<N>) -> VecN<N> {
        vec / vec.dot(self.metric(position) * vec).sqrt()
    }
}
