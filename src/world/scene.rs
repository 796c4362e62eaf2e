use super::background::Background;
use super::bvh::BvhTree;
use super::camera::Camera;
use super::entity::Entity;
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::math::Scalar;

// ─── Scene ──────────────────────────────────────────────────────────────────

/// Container of everything the renderer needs: the active camera, an
/// optional background and the entities. Entities may be added and mutated
/// freely until the scene is frozen; the freeze guard's borrow makes any
/// mutation (and a second concurrent freeze) a compile-time error for as
/// long as it lives.
///
/// A camera is required up front — there is no such thing as a renderable
/// scene without one.
pub struct Scene<const N: usize> {
    pub active_camera: Box<dyn Camera<N>>,
    pub active_background: Option<Box<dyn Background<N>>>,
    entities: Vec<Box<dyn Entity<N>>>,
}

impl<const N: usize> Scene<N> {
    pub fn new(active_camera: Box<dyn Camera<N>>) -> Self {
        Self {
            active_camera,
            active_background: None,
            entities: Vec::new(),
        }
    }

    /// Adds an entity. Scenes cannot nest: the entity container is not
    /// itself an entity, so there is no way to express a nested collection.
    pub fn add(&mut self, entity: Box<dyn Entity<N>>) {
        self.entities.push(entity);
    }

    /// Removes all entities.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Freezes the scene for one point in time: every animator is advanced
    /// to `time`, the BVH cache is built over the current entity shapes and
    /// a read-only view is returned. The scene stays locked (borrowed)
    /// until the guard is dropped.
    pub fn freeze_for_time(&mut self, time: Scalar) -> FreezeGuard<'_, N> {
        self.active_camera.set_time(time);
        for entity in &mut self.entities {
            entity.set_time(time);
        }

        let camera = &*self.active_camera;
        let background = self.active_background.as_deref();
        let bvh = BvhTree::build(self.entities.iter().map(|e| e.as_ref() as &dyn Entity<N>));
        FreezeGuard {
            camera,
            background,
            bvh,
        }
    }
}

// ─── Freeze Guard ───────────────────────────────────────────────────────────

/// Read-only view of a [`Scene`] frozen at one point in time, with a valid
/// BVH cache. Shareable across rendering threads; dropping it thaws the
/// scene.
pub struct FreezeGuard<'a, const N: usize> {
    camera: &'a dyn Camera<N>,
    background: Option<&'a dyn Background<N>>,
    bvh: BvhTree<'a, N>,
}

impl<'a, const N: usize> FreezeGuard<'a, N> {
    pub fn active_camera(&self) -> &'a dyn Camera<N> {
        self.camera
    }

    pub fn active_background(&self) -> Option<&'a dyn Background<N>> {
        self.background
    }

    /// Closest intersection of the segment with the frozen scene.
    pub fn hit_record(
        &self,
        geometry: &dyn Geometry<N>,
        segment: &RaySegment<N>,
        t_min: Scalar,
    ) -> Option<HitRecord<'_, N>> {
        self.bvh.hit_record(geometry, segment, t_min)
    }
}
