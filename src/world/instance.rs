use super::aabb::Aabb;
use super::entity::{Animator, Entity};
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::ident::EntityId;
use crate::math::{embedded_matrix, Mat, Mat3, Scalar, Vec3, VecN};

// ─── Instance ───────────────────────────────────────────────────────────────

/// Places an inner entity into the scene with a translation, per-axis scale
/// and (for the first three axes) a rotation. The hit query transforms the
/// ray into the inner entity's local frame, delegates, and transforms the
/// resulting point and normal back.
///
/// The transformation matrices are cached; they are refreshed on every
/// `set_time` and whenever the placement is changed through the setters.
pub struct Instance<const N: usize, E: Entity<N>> {
    pub id: EntityId,
    pub animator: Option<Box<dyn Animator<Instance<N, E>>>>,
    entity: E,
    position: VecN<N>,
    scale: VecN<N>,
    rotation: Vec3,
    transformation: Mat<N, N>,
    inverse_transformation: Mat<N, N>,
    onb_transformation: Mat3,
}

impl<const N: usize, E: Entity<N>> Instance<N, E> {
    pub fn new(entity: E) -> Self {
        let mut instance = Self {
            id: EntityId::default(),
            animator: None,
            entity,
            position: VecN::zero(),
            scale: VecN::new([1.0; N]),
            rotation: Vec3::zero(),
            transformation: Mat::identity(),
            inverse_transformation: Mat::identity(),
            onb_transformation: Mat::identity(),
        };
        instance.update_transformation();
        instance
    }

    pub fn position(&self) -> VecN<N> {
        self.position
    }

    pub fn set_position(&mut self, position: VecN<N>) {
        self.position = position;
    }

    pub fn scale(&self) -> VecN<N> {
        self.scale
    }

    pub fn set_scale(&mut self, scale: VecN<N>) {
        self.scale = scale;
        self.update_transformation();
    }

    /// Rotation angles applied to the first three axes (roll-pitch-yaw).
    /// Meaningful for flat geometries, where the instance frame is
    /// Cartesian.
    pub fn set_rotation(&mut self, angles: Vec3) {
        self.rotation = angles;
        self.update_transformation();
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut E {
        &mut self.entity
    }

    /// Recomputes the cached matrices: `world = S·R·local + position`.
    fn update_transformation(&mut self) {
        let rotation = embedded_rotation::<N>(Mat3::rotation(self.rotation));
        let inverse_rotation = embedded_rotation::<N>(Mat3::inverse_rotation(self.rotation));
        self.transformation = Mat::scaling(self.scale) * rotation;
        self.inverse_transformation = inverse_rotation * Mat::inverse_scaling(self.scale);
        let onb_scale = Vec3::new([self.scale[0], self.scale[1], self.scale[2]]);
        self.onb_transformation = Mat::scaling(onb_scale) * Mat3::rotation(self.rotation);
    }
}

/// `N×N` identity with the 3×3 rotation block in the upper-left corner.
fn embedded_rotation<const N: usize>(rotation: Mat3) -> Mat<N, N> {
    let mut matrix = embedded_matrix::<N, N, 0, 0, 3, 3>(rotation);
    let mut rows = matrix.0;
    for (k, row) in rows.iter_mut().enumerate().skip(3) {
        row[k] = 1.0;
    }
    matrix.0 = rows;
    matrix
}

impl<const N: usize, E: Entity<N>> Entity<N> for Instance<N, E> {
    fn set_time(&mut self, time: Scalar) {
        if let Some(mut animator) = self.animator.take() {
            animator.update_for_time(time, self);
            self.animator = Some(animator);
        }
        self.entity.set_time(time);
        self.update_transformation();
    }

    fn hit_record<'a>(
        &'a self,
        geometry: &dyn Geometry<N>,
        segment: &RaySegment<N>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, N>> {
        // inverse-transform the ray into instance space, delegate and
        // transform the record back
        let start = self.inverse_transformation * (segment.start - self.position);
        let direction = self.inverse_transformation * segment.direction;
        let local = RaySegment::new(start, direction, segment.t_max);

        let mut record = self.entity.hit_record(geometry, &local, t_min)?;
        record.point = self.transformation * record.point + self.position;
        record.onb_normal = (self.onb_transformation * record.onb_normal).unit();
        Some(record)
    }

    fn bounding_box(&self) -> Option<Aabb<N>> {
        // transform every corner — under rotation the axis-aligned hull of
        // the transformed box is larger than the two transformed extremes
        let bounds = self.entity.bounding_box()?;
        let (low, high) = (bounds.min(), bounds.max());
        let mut transformed_min = VecN::new([crate::math::INFINITY; N]);
        let mut transformed_max = VecN::new([-crate::math::INFINITY; N]);
        for mask in 0u32..(1 << N) {
            let mut corner = VecN::<N>::zero();
            for axis in 0..N {
                corner[axis] = if mask & (1 << axis) != 0 {
                    high[axis]
                } else {
                    low[axis]
                };
            }
            let world = self.transformation * corner + self.position;
            transformed_min = transformed_min.zip_with(world, Scalar::min);
            transformed_max = transformed_max.zip_with(world, Scalar::max);
        }
        Some(Aabb::new(transformed_min, transformed_max))
    }
}
