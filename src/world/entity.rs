use super::aabb::Aabb;
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::math::Scalar;

// ─── Animator ───────────────────────────────────────────────────────────────

/// Drives an entity's fields as a function of scene time. Entities without
/// an animator are static. Any `FnMut(Scalar, &mut T)` closure works:
///
/// ```ignore
/// sphere.animator = Some(Box::new(|time, state: &mut SphereState<3>| {
///     state.position[0] = time;
/// }));
/// ```
pub trait Animator<T: ?Sized>: Send + Sync {
    fn update_for_time(&mut self, time: Scalar, target: &mut T);
}

impl<T: ?Sized, F> Animator<T> for F
where
    F: FnMut(Scalar, &mut T) + Send + Sync,
{
    fn update_for_time(&mut self, time: Scalar, target: &mut T) {
        self(time, target);
    }
}

// ─── Entity ─────────────────────────────────────────────────────────────────

/// Anything a ray can intersect. Entities live on the manifold; the hit
/// query receives the geometry so that normals and Jacobians can be
/// computed with the local metric.
pub trait Entity<const N: usize>: Send + Sync {
    /// Requests the entity to take its appearance for the given time.
    /// Static entities ignore this entirely.
    fn set_time(&mut self, _time: Scalar) {}

    /// Intersects the segment with the entity. `None` means no hit with
    /// parameter in `[t_min, segment.t_max)`.
    fn hit_record<'a>(
        &'a self,
        geometry: &dyn Geometry<N>,
        segment: &RaySegment<N>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, N>>;

    /// Bounding box, if the entity is bounded. `None` means the entity may
    /// be infinitely large.
    fn bounding_box(&self) -> Option<Aabb<N>>;

    /// Must agree with `bounding_box().is_some()`; exists so that callers
    /// can test boundedness without constructing the box.
    fn is_bounded(&self) -> bool {
        self.bounding_box().is_some()
    }
}
