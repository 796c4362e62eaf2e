use super::aabb::Aabb;
use super::entity::Entity;
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::ident::EntityId;
use crate::material::Material;
use crate::math::{vec2, vec3, Scalar, INFINITY};
use crate::random::random_scalar;
use std::sync::Arc;

// ─── Constant-Density Mist ──────────────────────────────────────────────────

/// A participating medium of constant density filling a convex boundary
/// entity. The probability of a scattering event grows exponentially with
/// the distance travelled inside the boundary; the sampled hit distance is
/// `−(1/ρ)·ln U(0,1)`. Pairs with an isotropic material.
///
/// Suitable for convex boundaries only — the two consecutive boundary hits
/// are assumed to delimit a single interior interval.
pub struct Mist<const N: usize, E: Entity<N>> {
    pub id: EntityId,
    pub boundary: E,
    pub density: Scalar,
    pub material: Option<Arc<dyn Material<N>>>,
}

impl<const N: usize, E: Entity<N>> Mist<N, E> {
    pub fn new(boundary: E, density: Scalar) -> Self {
        Self {
            id: EntityId::default(),
            boundary,
            density,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material<N>>) -> Self {
        self.material = Some(material);
        self
    }
}

impl<const N: usize, E: Entity<N>> Entity<N> for Mist<N, E> {
    fn set_time(&mut self, time: Scalar) {
        self.boundary.set_time(time);
    }

    fn hit_record<'a>(
        &'a self,
        geometry: &dyn Geometry<N>,
        segment: &RaySegment<N>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, N>> {
        // the two consecutive boundary crossings, from anywhere on the line
        // (deliberately unclipped; the interval is intersected with the
        // segment afterwards)
        let unbounded = RaySegment::new(segment.start, segment.direction, INFINITY);
        let first = self.boundary.hit_record(geometry, &unbounded, -INFINITY)?;
        let t_star = first.t + first.t.abs() * 1e-8;
        let second = self.boundary.hit_record(geometry, &unbounded, t_star)?;

        let mut entry = first.t;
        let mut exit = second.t;
        if entry < t_min {
            entry = t_min;
        }
        if exit > segment.t_max {
            exit = segment.t_max;
        }
        if entry >= exit {
            return None;
        }
        if entry < 0.0 {
            entry = 0.0;
        }

        let ray_length = segment.direction.length();
        let distance_inside = (exit - entry) * ray_length;
        let hit_distance = -1.0 / self.density * random_scalar(0.0, 1.0).ln();
        if hit_distance > distance_inside {
            return None;
        }

        let t = entry + hit_distance / ray_length;
        let point = segment.at(t);
        Some(HitRecord {
            t,
            point,
            to_onb_jacobian: geometry.to_onb_jacobian(point),
            from_onb_jacobian: geometry.from_onb_jacobian(point),
            // arbitrary — the isotropic material ignores the normal
            onb_normal: vec3(1.0, 0.0, 0.0),
            uv_coordinates: vec2(0.0, 0.0),
            material: self.material.as_deref(),
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Option<Aabb<N>> {
        self.boundary.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Euclidean3;
    use crate::math::{vec3, Vec3};
    use crate::world::sphere::Sphere;

    fn dense_mist() -> Mist<3, Sphere<3>> {
        // density so high that any interior interval scatters
        Mist::new(Sphere::new(Vec3::zero(), 1.0), 1e9)
    }

    #[test]
    fn rays_through_the_boundary_scatter_inside() {
        let mist = dense_mist();
        let segment = RaySegment::unbounded(vec3(0.0, 0.0, 5.0), vec3(0.0, 0.0, -1.0));
        let record = mist
            .hit_record(&Euclidean3, &segment, 1e-5)
            .expect("dense mist must scatter");
        assert!(record.t >= 4.0 && record.t <= 6.0);
        assert!(record.point.length() <= 1.0 + 1e-9);
    }

    #[test]
    fn rays_missing_the_boundary_pass() {
        let mist = dense_mist();
        let segment = RaySegment::unbounded(vec3(0.0, 5.0, 5.0), vec3(0.0, 0.0, -1.0));
        assert!(mist.hit_record(&Euclidean3, &segment, 1e-5).is_none());
    }

    #[test]
    fn thin_mist_mostly_passes() {
        let mist = Mist::new(Sphere::new(Vec3::zero(), 1.0), 1e-9);
        let segment = RaySegment::unbounded(vec3(0.0, 0.0, 5.0), vec3(0.0, 0.0, -1.0));
        let mut scattered = 0;
        for _ in 0..100 {
            if mist.hit_record(&Euclidean3, &segment, 1e-5).is_some() {
                scattered += 1;
            }
        }
        assert_eq!(scattered, 0);
    }

    #[test]
    fn starting_inside_clips_the_entry() {
        let mist = dense_mist();
        let segment = RaySegment::unbounded(Vec3::zero(), vec3(0.0, 0.0, -1.0));
        let record = mist
            .hit_record(&Euclidean3, &segment, 1e-5)
            .expect("must scatter");
        assert!(record.t >= 0.0 && record.t <= 1.0 + 1e-9);
    }

    #[test]
    fn bounded_iff_the_boundary_is_bounded() {
        let mist = dense_mist();
        assert!(mist.is_bounded());
    }
}
