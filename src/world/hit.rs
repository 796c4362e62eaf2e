use crate::material::Material;
use crate::math::{Mat, Scalar, Vec2, Vec3, VecN};

// ─── Hit Record ─────────────────────────────────────────────────────────────

/// Everything needed to shade a ray-entity intersection. The record mediates
/// between entities (which live on the manifold) and materials (which live
/// in a local 3D orthonormal frame): the two Jacobians translate directions
/// between the worlds.
pub struct HitRecord<'a, const N: usize> {
    /// Ray segment parameter of the intersection.
    pub t: Scalar,
    /// Intersection point in manifold coordinates.
    pub point: VecN<N>,
    /// Maps tangent vectors at `point` into the local orthonormal frame.
    pub to_onb_jacobian: Mat<3, N>,
    /// Maps local orthonormal vectors back into tangent vectors at `point`.
    pub from_onb_jacobian: Mat<N, 3>,
    /// Unit surface normal in the orthonormal frame, flipped to face the
    /// incoming ray.
    pub onb_normal: Vec3,
    /// Surface parameters for texture lookup.
    pub uv_coordinates: Vec2,
    /// Material of the hit surface; `None` renders as a loud sentinel color.
    pub material: Option<&'a dyn Material<N>>,
    /// True iff the ray hit the outward side of the surface.
    pub front_face: bool,
}

impl<'a, const N: usize> HitRecord<'a, N> {
    /// Fills in all local-tangent-space quantities from a manifold-space
    /// face normal: `front_face := ⟨n, g·d⟩ < 0`, and the stored ONB normal
    /// is `±J·n` with the sign chosen so that it faces the incoming ray.
    pub fn with_local_geometry(
        t: Scalar,
        point: VecN<N>,
        uv_coordinates: Vec2,
        material: Option<&'a dyn Material<N>>,
        metric: Mat<N, N>,
        to_onb_jacobian: Mat<3, N>,
        from_onb_jacobian: Mat<N, 3>,
        ray_direction: VecN<N>,
        face_normal: VecN<N>,
    ) -> Self {
        let front_face = face_normal.dot(metric * ray_direction) < 0.0;
        let onb_normal = to_onb_jacobian * face_normal;
        let onb_normal = if front_face { onb_normal } else { -onb_normal };
        Self {
            t,
            point,
            to_onb_jacobian,
            from_onb_jacobian,
            onb_normal: onb_normal.unit(),
            uv_coordinates,
            material,
            front_face,
        }
    }
}
