use super::aabb::Aabb;
use super::entity::{Animator, Entity};
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::ident::EntityId;
use crate::material::Material;
use crate::math::{vec2, vec3, Scalar};
use std::sync::Arc;

// ─── Plane ──────────────────────────────────────────────────────────────────

/// The centered unit square in the x–y plane facing +z. Each of the four
/// edges can individually be released to infinity, which turns the square
/// into a half-plane, a strip or the whole plane. With all edges finite the
/// plane is bounded (with a hair of z thickness so its box is never
/// degenerate).
pub struct Plane {
    pub id: EntityId,
    pub finite_neg_x: bool,
    pub finite_pos_x: bool,
    pub finite_neg_y: bool,
    pub finite_pos_y: bool,
    pub material: Option<Arc<dyn Material<3>>>,
    pub animator: Option<Box<dyn Animator<Plane>>>,
}

const FINITE_X_MIN: Scalar = -1.0;
const FINITE_X_MAX: Scalar = 1.0;
const FINITE_Y_MIN: Scalar = -1.0;
const FINITE_Y_MAX: Scalar = 1.0;

impl Plane {
    pub fn new() -> Self {
        Self {
            id: EntityId::default(),
            finite_neg_x: true,
            finite_pos_x: true,
            finite_neg_y: true,
            finite_pos_y: true,
            material: None,
            animator: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material<3>>) -> Self {
        self.material = Some(material);
        self
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity<3> for Plane {
    fn set_time(&mut self, time: Scalar) {
        if let Some(mut animator) = self.animator.take() {
            animator.update_for_time(time, self);
            self.animator = Some(animator);
        }
    }

    fn hit_record<'a>(
        &'a self,
        geometry: &dyn Geometry<3>,
        segment: &RaySegment<3>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, 3>> {
        if segment.direction[2] == 0.0 {
            return None;
        }
        let t = -segment.start[2] / segment.direction[2];
        if t < t_min || t > segment.t_max {
            return None;
        }

        let point = segment.at(t);
        if (self.finite_neg_x && point[0] < FINITE_X_MIN)
            || (self.finite_pos_x && point[0] > FINITE_X_MAX)
            || (self.finite_neg_y && point[1] < FINITE_Y_MIN)
            || (self.finite_pos_y && point[1] > FINITE_Y_MAX)
        {
            return None;
        }

        Some(HitRecord::with_local_geometry(
            t,
            point,
            vec2(point[0], point[1]),
            self.material.as_deref(),
            geometry.metric(point),
            geometry.to_onb_jacobian(point),
            geometry.from_onb_jacobian(point),
            segment.direction,
            vec3(0.0, 0.0, 1.0),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb<3>> {
        // any released edge makes the plane unbounded
        if !(self.finite_neg_x && self.finite_pos_x && self.finite_neg_y && self.finite_pos_y) {
            return None;
        }
        Some(Aabb::new(
            vec3(FINITE_X_MIN, FINITE_Y_MIN, -1e-8),
            vec3(FINITE_X_MAX, FINITE_Y_MAX, 1e-8),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Euclidean3;
    use approx::assert_relative_eq;

    #[test]
    fn frontal_hit_lands_in_the_square() {
        let plane = Plane::new();
        let segment = RaySegment::unbounded(vec3(0.25, -0.5, 2.0), vec3(0.0, 0.0, -1.0));
        let record = plane
            .hit_record(&Euclidean3, &segment, 0.0)
            .expect("must hit");
        assert_relative_eq!(record.t, 2.0, epsilon = 1e-12);
        assert!(record.front_face);
        assert_eq!(record.uv_coordinates, vec2(0.25, -0.5));
    }

    #[test]
    fn parallel_rays_miss() {
        let plane = Plane::new();
        let segment = RaySegment::unbounded(vec3(0.0, 0.0, 1.0), vec3(1.0, 0.0, 0.0));
        assert!(plane.hit_record(&Euclidean3, &segment, 0.0).is_none());
    }

    #[test]
    fn points_outside_finite_edges_miss() {
        let plane = Plane::new();
        let segment = RaySegment::unbounded(vec3(1.5, 0.0, 2.0), vec3(0.0, 0.0, -1.0));
        assert!(plane.hit_record(&Euclidean3, &segment, 0.0).is_none());
    }

    #[test]
    fn released_edges_extend_to_infinity() {
        let mut plane = Plane::new();
        plane.finite_pos_x = false;
        let segment = RaySegment::unbounded(vec3(100.0, 0.0, 2.0), vec3(0.0, 0.0, -1.0));
        assert!(plane.hit_record(&Euclidean3, &segment, 0.0).is_some());
        assert!(!plane.is_bounded());
        assert!(plane.bounding_box().is_none());
    }

    #[test]
    fn fully_finite_plane_is_bounded() {
        let plane = Plane::new();
        assert!(plane.is_bounded());
        let bounds = plane.bounding_box().unwrap();
        assert_eq!(bounds.min()[0], -1.0);
        assert_eq!(bounds.max()[1], 1.0);
    }
}
