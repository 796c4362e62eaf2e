use super::{Geometry, ManifoldRay, RaySegment};
use crate::math::{embedded_matrix, Mat, VecN};

// ─── Single-Segment Ray ─────────────────────────────────────────────────────

/// Ray of a flat geometry: one unbounded straight segment, delivered once.
pub(crate) struct SingleSegmentRay<const N: usize> {
    segment: Option<RaySegment<N>>,
}

impl<const N: usize> SingleSegmentRay<N> {
    pub fn new(start: VecN<N>, direction: VecN<N>) -> Self {
        Self {
            segment: Some(RaySegment::unbounded(start, direction)),
        }
    }
}

impl<const N: usize> ManifoldRay<N> for SingleSegmentRay<N> {
    fn next_ray_segment(&mut self) -> Option<RaySegment<N>> {
        self.segment.take()
    }
}

// ─── Euclidean Geometry ─────────────────────────────────────────────────────

/// Flat Euclidean space of dimension `N ≥ 3`. The first three coordinates
/// span the local orthonormal frame, so for `N = 3` the Jacobians are plain
/// identities and for higher `N` they are zero-padded identity blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean<const N: usize>;

/// Flat 3D space — the geometry of every conventional path tracer.
pub type Euclidean3 = Euclidean<3>;

/// Unit value of [`Euclidean3`], usable wherever a concrete instance is needed
/// (type aliases cannot be used as unit-struct constructors in value position).
#[allow(non_upper_case_globals)]
pub const Euclidean3: Euclidean3 = Euclidean;

impl<const N: usize> Geometry<N> for Euclidean<N> {
    fn ray_from<'a>(
        &'a self,
        start: VecN<N>,
        direction: VecN<N>,
    ) -> Box<dyn ManifoldRay<N> + 'a> {
        Box::new(SingleSegmentRay::new(start, direction))
    }

    fn ray_passing_through<'a>(
        &'a self,
        start: VecN<N>,
        target: VecN<N>,
    ) -> Box<dyn ManifoldRay<N> + 'a> {
        Box::new(SingleSegmentRay::new(start, (target - start).unit()))
    }

    fn to_onb_jacobian(&self, _position: VecN<N>) -> Mat<3, N> {
        embedded_matrix::<3, N, 0, 0, 3, 3>(Mat::identity())
    }

    fn from_onb_jacobian(&self, _position: VecN<N>) -> Mat<N, 3> {
        embedded_matrix::<N, 3, 0, 0, 3, 3>(Mat::identity())
    }

    fn metric(&self, _position: VecN<N>) -> Mat<N, N> {
        Mat::identity()
    }
}
