use super::aabb::Aabb;
use super::entity::{Animator, Entity};
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::ident::EntityId;
use crate::material::Material;
use crate::math::{vec2, Scalar, Vec3};
use std::sync::Arc;

// ─── Small Triangles ────────────────────────────────────────────────────────

/// In-plane coordinates of `x` with respect to the (non-orthogonal) basis
/// `(b1, b2)`: solves the 2×2 Gram system.
fn coords_in_plane(b1: Vec3, b2: Vec3, x: Vec3) -> (Scalar, Scalar) {
    let b1b1 = b1.dot(b1);
    let b1b2 = b1.dot(b2);
    let b2b2 = b2.dot(b2);
    let d = b1b1 * b2b2 - b1b2 * b1b2;
    let b1x = b1.dot(x);
    let b2x = b2.dot(x);
    let u = (b1b1 * b2x - b1b2 * b1x) / d;
    let v = (b2b2 * b1x - b1b2 * b2x) / d;
    (u, v)
}

/// Shared hit logic of [`SmallTriangle`] and [`TriangleMesh`]: plane
/// intersection via the ambient metric plus a barycentric containment test.
fn small_triangle_hit_record<'a>(
    geometry: &dyn Geometry<3>,
    segment: &RaySegment<3>,
    t_min: Scalar,
    points: &[Vec3; 3],
    material: Option<&'a dyn Material<3>>,
) -> Option<HitRecord<'a, 3>> {
    // basis for the span
    let b1 = points[1] - points[0];
    let b2 = points[2] - points[0];
    // pseudo-normal (NOT the face normal)
    let n = b1.cross(b2).unit();
    // level parameter
    let l = n.dot(points[0]);

    let s = segment.start;
    let d = segment.direction;

    let a = l - s.dot(n);
    let b = d.dot(n);
    if b == 0.0 {
        // ray 'parallel' to face
        return None;
    }

    let t = a / b;
    if t < t_min || t >= segment.t_max {
        return None;
    }

    let (u, v) = coords_in_plane(b1, b2, (s + d * t) - points[0]);
    if u < 0.0 || v < 0.0 || u + v > 1.0 {
        return None;
    }

    let point = segment.at(t);
    let metric = geometry.metric(point);
    let to_onb_jacobian = geometry.to_onb_jacobian(point);
    let from_onb_jacobian = geometry.from_onb_jacobian(point);

    // note: the face normal is taken from the metric-aware cross product of
    //       the coordinate deltas. This is only valid while the curvature
    //       ACROSS the triangle is insignificant — the "small" in the name.
    let normal = (metric * b1).cross(metric * b2);
    let normal = normal * (1.0 / normal.dot(metric * normal).sqrt());

    Some(HitRecord::with_local_geometry(
        t,
        point,
        vec2(u, v),
        material,
        metric,
        to_onb_jacobian,
        from_onb_jacobian,
        d,
        normal,
    ))
}

/// A single triangle, small enough that the geometry's curvature across it
/// is negligible.
pub struct SmallTriangle {
    pub id: EntityId,
    pub points: [Vec3; 3],
    pub material: Option<Arc<dyn Material<3>>>,
    pub animator: Option<Box<dyn Animator<SmallTriangle>>>,
}

impl SmallTriangle {
    pub fn new(points: [Vec3; 3]) -> Self {
        Self {
            id: EntityId::default(),
            points,
            material: None,
            animator: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material<3>>) -> Self {
        self.material = Some(material);
        self
    }
}

impl Entity<3> for SmallTriangle {
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
        small_triangle_hit_record(
            geometry,
            segment,
            t_min,
            &self.points,
            self.material.as_deref(),
        )
    }

    fn bounding_box(&self) -> Option<Aabb<3>> {
        Some(points_bounding_box(&self.points))
    }
}

/// Padded bounds of a point cloud; never degenerate in any axis.
fn points_bounding_box(points: &[Vec3]) -> Aabb<3> {
    const EPSILON: Scalar = 1e-8;
    let mut low = points[0];
    let mut high = points[0];
    for point in &points[1..] {
        low = low.zip_with(*point, Scalar::min);
        high = high.zip_with(*point, Scalar::max);
    }
    // padding to guarantee non-zero volume
    low -= low.map(Scalar::abs) * EPSILON;
    high += high.map(Scalar::abs) * EPSILON;
    for i in 0..3 {
        if low[i] == high[i] {
            low[i] -= EPSILON;
            high[i] += EPSILON;
        }
    }
    Aabb::new(low, high)
}

// ─── Triangle Mesh ──────────────────────────────────────────────────────────

/// A mesh of small triangles sharing one material: vertex positions plus
/// index triples. The mesh counts as a single entity — one bounding box,
/// one BVH slot — which suits meshes of moderate size.
pub struct TriangleMesh {
    pub id: EntityId,
    pub points: Vec<Vec3>,
    pub faces: Vec<[usize; 3]>,
    pub material: Option<Arc<dyn Material<3>>>,
    pub animator: Option<Box<dyn Animator<TriangleMesh>>>,
}

impl TriangleMesh {
    pub fn new(points: Vec<Vec3>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            id: EntityId::default(),
            points,
            faces,
            material: None,
            animator: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material<3>>) -> Self {
        self.material = Some(material);
        self
    }
}

impl Entity<3> for TriangleMesh {
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
        let mut closest: Option<HitRecord<'a, 3>> = None;
        for face in &self.faces {
            let corners = [
                self.points[face[0]],
                self.points[face[1]],
                self.points[face[2]],
            ];
            if let Some(record) = small_triangle_hit_record(
                geometry,
                segment,
                t_min,
                &corners,
                self.material.as_deref(),
            ) {
                if closest.as_ref().map_or(true, |c| record.t < c.t) {
                    closest = Some(record);
                }
            }
        }
        closest
    }

    fn bounding_box(&self) -> Option<Aabb<3>> {
        if self.points.is_empty() {
            return None;
        }
        Some(points_bounding_box(&self.points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Euclidean3;
    use crate::math::vec3;
    use approx::assert_relative_eq;

    fn xy_triangle() -> SmallTriangle {
        SmallTriangle::new([
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn hits_inside_the_barycentric_region() {
        let triangle = xy_triangle();
        let segment = RaySegment::unbounded(vec3(0.25, 0.25, 1.0), vec3(0.0, 0.0, -1.0));
        let record = triangle
            .hit_record(&Euclidean3, &segment, 0.0)
            .expect("must hit");
        assert_relative_eq!(record.t, 1.0, epsilon = 1e-12);
        assert_relative_eq!(record.uv_coordinates.u(), 0.25, epsilon = 1e-12);
        assert_relative_eq!(record.uv_coordinates.v(), 0.25, epsilon = 1e-12);
        assert!(record.front_face);
    }

    #[test]
    fn misses_outside_the_barycentric_region() {
        let triangle = xy_triangle();
        let segment = RaySegment::unbounded(vec3(0.75, 0.75, 1.0), vec3(0.0, 0.0, -1.0));
        assert!(triangle.hit_record(&Euclidean3, &segment, 0.0).is_none());
    }

    #[test]
    fn parallel_rays_miss() {
        let triangle = xy_triangle();
        let segment = RaySegment::unbounded(vec3(0.0, 0.0, 1.0), vec3(1.0, 0.0, 0.0));
        assert!(triangle.hit_record(&Euclidean3, &segment, 0.0).is_none());
    }

    #[test]
    fn flat_triangle_still_has_a_volume_box() {
        let triangle = xy_triangle();
        let bounds = triangle.bounding_box().unwrap();
        assert!(bounds.max()[2] > bounds.min()[2]);
    }

    #[test]
    fn mesh_returns_the_closest_face() {
        // two parallel triangles stacked in z
        let mesh = TriangleMesh::new(
            vec![
                vec3(0.0, 0.0, 0.0),
                vec3(1.0, 0.0, 0.0),
                vec3(0.0, 1.0, 0.0),
                vec3(0.0, 0.0, 0.5),
                vec3(1.0, 0.0, 0.5),
                vec3(0.0, 1.0, 0.5),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        );
        let segment = RaySegment::unbounded(vec3(0.25, 0.25, 2.0), vec3(0.0, 0.0, -1.0));
        let record = mesh
            .hit_record(&Euclidean3, &segment, 0.0)
            .expect("must hit");
        assert_relative_eq!(record.t, 1.5, epsilon = 1e-12);
        assert_relative_eq!(record.point[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn empty_mesh_is_unbounded_and_never_hit() {
        let mesh = TriangleMesh::new(vec![], vec![]);
        assert!(mesh.bounding_box().is_none());
        let segment = RaySegment::unbounded(vec3(0.0, 0.0, 1.0), vec3(0.0, 0.0, -1.0));
        assert!(mesh.hit_record(&Euclidean3, &segment, 0.0).is_none());
    }
}
