use super::aabb::Aabb;
use super::entity::{Animator, Entity};
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::ident::EntityId;
use crate::material::Material;
use crate::math::{vec2, Scalar, VecN};
use std::sync::Arc;

// ─── Sphere ─────────────────────────────────────────────────────────────────

/// A coordinate sphere in `N` dimensions: the set of points at coordinate
/// distance `radius` from `position`. A negative radius flips the surface
/// orientation (inside out) — the classic trick for hollow glass shells.
///
/// The intersection is solved in coordinates; in curved geometries the
/// result is the coordinate sphere, which is exactly what the analytic
/// geometries here intend.
pub struct Sphere<const N: usize> {
    pub id: EntityId,
    pub position: VecN<N>,
    pub radius: Scalar,
    pub material: Option<Arc<dyn Material<N>>>,
    pub animator: Option<Box<dyn Animator<Sphere<N>>>>,
}

impl<const N: usize> Sphere<N> {
    pub fn new(position: VecN<N>, radius: Scalar) -> Self {
        Self {
            id: EntityId::default(),
            position,
            radius,
            material: None,
            animator: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material<N>>) -> Self {
        self.material = Some(material);
        self
    }
}

impl<const N: usize> Entity<N> for Sphere<N> {
    fn set_time(&mut self, time: Scalar) {
        if let Some(mut animator) = self.animator.take() {
            animator.update_for_time(time, self);
            self.animator = Some(animator);
        }
    }

    fn hit_record<'a>(
        &'a self,
        geometry: &dyn Geometry<N>,
        segment: &RaySegment<N>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, N>> {
        // analytical geometry: line hits sphere
        // ray: s + t*d
        // sphere: (x - o)² = R²
        // solve: a·t² + 2·(b/2)·t + c = 0
        let delta = segment.start - self.position;
        let a = segment.direction.length_squared();
        let b_half = segment.direction.dot(delta);
        let c = delta.length_squared() - self.radius * self.radius;
        let discriminant = b_half * b_half - a * c;
        if discriminant < 0.0 {
            return None;
        }

        // select the minimal solution in range:
        // t₋>0, t₊>0: the ray enters the sphere at t₋
        // t₋<0, t₊>0: the ray starts inside and leaves at t₊
        // t₋<0, t₊<0: the sphere lies behind the ray
        let sqrt_d = discriminant.sqrt();
        let mut t = (-b_half - sqrt_d) / a;
        if t < t_min || t > segment.t_max {
            t = (-b_half + sqrt_d) / a;
            if t < t_min || t > segment.t_max {
                return None;
            }
        }

        let point = segment.at(t);
        let metric = geometry.metric(point);
        let to_onb_jacobian = geometry.to_onb_jacobian(point);
        let from_onb_jacobian = geometry.from_onb_jacobian(point);

        // outward for positive radius, inward for negative radius
        let face_normal = (point - self.position) / self.radius;

        Some(HitRecord::with_local_geometry(
            t,
            point,
            vec2(0.0, 0.0),
            self.material.as_deref(),
            metric,
            to_onb_jacobian,
            from_onb_jacobian,
            segment.direction,
            face_normal,
        ))
    }

    fn bounding_box(&self) -> Option<Aabb<N>> {
        let corner = VecN::new([self.radius.abs(); N]);
        Some(Aabb::new(self.position - corner, self.position + corner))
    }
}
