use super::aabb::Aabb;
use super::entity::Entity;
use super::hit::HitRecord;
use crate::geometry::{Geometry, RaySegment};
use crate::math::Scalar;
use std::cmp::Ordering;

// ─── Bounding Volume Hierarchy ──────────────────────────────────────────────

/// Binary tree of axis-aligned boxes over the bounded entities of a scene,
/// used to skip whole subsets during intersection. Unbounded entities have
/// no box to sort into and are scanned linearly after the tree.
///
/// The tree borrows the entities; it is built per freeze and invalidated by
/// any change to them (which the freeze guard's borrow rules out). Queries
/// are read-only and safe to run from many threads at once.
pub struct BvhTree<'a, const N: usize> {
    root: BvhNode<'a, N>,
    unbounded: Vec<&'a dyn Entity<N>>,
}

enum BvhNode<'a, const N: usize> {
    Empty,
    Leaf {
        entity: &'a dyn Entity<N>,
        bounds: Aabb<N>,
    },
    Interior {
        left: Box<BvhNode<'a, N>>,
        right: Box<BvhNode<'a, N>>,
        bounds: Aabb<N>,
    },
}

/// Below this many entities a subtree is built sequentially; splitting
/// smaller ranges across threads costs more than it saves.
const PARALLEL_BUILD_THRESHOLD: usize = 64;

impl<'a, const N: usize> BvhTree<'a, N> {
    /// Partitions the entities by boundedness and builds the tree over the
    /// bounded ones.
    pub fn build(entities: impl IntoIterator<Item = &'a dyn Entity<N>>) -> Self {
        let mut bounded: Vec<(&'a dyn Entity<N>, Aabb<N>)> = Vec::new();
        let mut unbounded: Vec<&'a dyn Entity<N>> = Vec::new();
        for entity in entities {
            match entity.bounding_box() {
                Some(bounds) => bounded.push((entity, bounds)),
                None => unbounded.push(entity),
            }
        }
        Self {
            root: BvhNode::build(&mut bounded),
            unbounded,
        }
    }

    /// Closest hit over every entity: tree first, then the unbounded list.
    pub fn hit_record(
        &self,
        geometry: &dyn Geometry<N>,
        segment: &RaySegment<N>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, N>> {
        let mut closest = self.root.hit_record(geometry, segment, t_min);
        for entity in &self.unbounded {
            if let Some(record) = entity.hit_record(geometry, segment, t_min) {
                if closest.as_ref().map_or(true, |c| record.t < c.t) {
                    closest = Some(record);
                }
            }
        }
        closest
    }

    /// Box around every entity; `None` while any unbounded entity exists.
    pub fn bounding_box(&self) -> Option<Aabb<N>> {
        if !self.unbounded.is_empty() {
            return None;
        }
        self.root.bounds()
    }

    pub fn len_bounded(&self) -> usize {
        self.root.len()
    }

    pub fn len_unbounded(&self) -> usize {
        self.unbounded.len()
    }

    pub fn len(&self) -> usize {
        self.len_bounded() + self.len_unbounded()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a, const N: usize> BvhNode<'a, N> {
    fn build(entities: &mut [(&'a dyn Entity<N>, Aabb<N>)]) -> Self {
        match entities.len() {
            0 => BvhNode::Empty,
            1 => BvhNode::Leaf {
                entity: entities[0].0,
                bounds: entities[0].1,
            },
            len => {
                // split along the widest axis of the enclosing box, sorted
                // by the per-axis box minimum
                let enclosing = entities
                    .iter()
                    .map(|(_, bounds)| *bounds)
                    .reduce(|a, b| Aabb::surrounding(&a, &b))
                    .expect("at least two boxes");
                let axis = enclosing.largest_extent_axis();
                entities.sort_by(|(_, a), (_, b)| {
                    a.min()[axis]
                        .partial_cmp(&b.min()[axis])
                        .unwrap_or(Ordering::Equal)
                });

                let (first, second) = entities.split_at_mut(len / 2);
                // the halves are disjoint, so subtree builds can run in
                // parallel
                let (left, right) = if len >= PARALLEL_BUILD_THRESHOLD {
                    rayon::join(|| BvhNode::build(first), || BvhNode::build(second))
                } else {
                    (BvhNode::build(first), BvhNode::build(second))
                };

                let bounds = match (left.bounds(), right.bounds()) {
                    (Some(a), Some(b)) => Aabb::surrounding(&a, &b),
                    (Some(a), None) | (None, Some(a)) => a,
                    (None, None) => unreachable!("both halves are non-empty"),
                };
                BvhNode::Interior {
                    left: Box::new(left),
                    right: Box::new(right),
                    bounds,
                }
            }
        }
    }

    fn bounds(&self) -> Option<Aabb<N>> {
        match self {
            BvhNode::Empty => None,
            BvhNode::Leaf { bounds, .. } | BvhNode::Interior { bounds, .. } => Some(*bounds),
        }
    }

    fn len(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Interior { left, right, .. } => left.len() + right.len(),
        }
    }

    fn hit_record(
        &self,
        geometry: &dyn Geometry<N>,
        segment: &RaySegment<N>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, N>> {
        match self {
            BvhNode::Empty => None,
            BvhNode::Leaf { entity, bounds } => {
                if !bounds.hit(segment, t_min, segment.t_max) {
                    return None;
                }
                entity.hit_record(geometry, segment, t_min)
            }
            BvhNode::Interior {
                left,
                right,
                bounds,
            } => {
                if !bounds.hit(segment, t_min, segment.t_max) {
                    return None;
                }
                let left_hit = left.hit_record(geometry, segment, t_min);
                let right_hit = right.hit_record(geometry, segment, t_min);
                match (left_hit, right_hit) {
                    (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
                    (hit, None) | (None, hit) => hit,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Euclidean3;
    use crate::math::{vec3, Vec3, VecN};
    use crate::random::random_scalar;
    use crate::world::plane::Plane;
    use crate::world::sphere::Sphere;
    use approx::assert_relative_eq;

    fn random_spheres(count: usize) -> Vec<Sphere<3>> {
        (0..count)
            .map(|_| {
                Sphere::new(
                    vec3(
                        random_scalar(-10.0, 10.0),
                        random_scalar(-10.0, 10.0),
                        random_scalar(-10.0, 10.0),
                    ),
                    1.0,
                )
            })
            .collect()
    }

    fn brute_force_hit<'a>(
        entities: &'a [Sphere<3>],
        segment: &RaySegment<3>,
        t_min: Scalar,
    ) -> Option<HitRecord<'a, 3>> {
        let mut closest: Option<HitRecord<'a, 3>> = None;
        for entity in entities {
            if let Some(record) = entity.hit_record(&Euclidean3, segment, t_min) {
                if closest.as_ref().map_or(true, |c| record.t < c.t) {
                    closest = Some(record);
                }
            }
        }
        closest
    }

    #[test]
    fn tree_matches_brute_force() {
        let spheres = random_spheres(1000);
        let tree = BvhTree::build(spheres.iter().map(|s| s as &dyn Entity<3>));
        assert_eq!(tree.len_bounded(), 1000);

        for _ in 0..100 {
            let start = vec3(
                random_scalar(-15.0, 15.0),
                random_scalar(-15.0, 15.0),
                random_scalar(-15.0, 15.0),
            );
            let direction = VecN::random(-1.0, 1.0);
            if direction.near_zero(1e-3) {
                continue;
            }
            let segment = RaySegment::unbounded(start, direction.unit());

            let expected = brute_force_hit(&spheres, &segment, 1e-5);
            let actual = tree.hit_record(&Euclidean3, &segment, 1e-5);
            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => assert_relative_eq!(e.t, a.t, epsilon = 1e-12),
                (e, a) => panic!(
                    "BVH and brute force disagree: {:?} vs {:?}",
                    e.map(|h| h.t),
                    a.map(|h| h.t)
                ),
            }
        }
    }

    #[test]
    fn unbounded_entities_are_scanned_linearly() {
        let mut plane = Plane::new();
        plane.finite_neg_x = false;
        plane.finite_pos_x = false;
        plane.finite_neg_y = false;
        plane.finite_pos_y = false;
        let sphere = Sphere::new(vec3(0.0, 0.0, 3.0), 1.0);

        let entities: Vec<&dyn Entity<3>> = vec![&plane, &sphere];
        let tree = BvhTree::build(entities);
        assert_eq!(tree.len_bounded(), 1);
        assert_eq!(tree.len_unbounded(), 1);
        assert!(tree.bounding_box().is_none());

        // the sphere is closer than the plane along this ray
        let segment = RaySegment::unbounded(vec3(0.0, 0.0, 10.0), vec3(0.0, 0.0, -1.0));
        let record = tree
            .hit_record(&Euclidean3, &segment, 1e-5)
            .expect("must hit");
        assert_relative_eq!(record.t, 6.0, epsilon = 1e-12);

        // outside the sphere's shadow the plane is found
        let segment = RaySegment::unbounded(vec3(7.0, 0.0, 10.0), vec3(0.0, 0.0, -1.0));
        let record = tree
            .hit_record(&Euclidean3, &segment, 1e-5)
            .expect("must hit");
        assert_relative_eq!(record.t, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_tree_hits_nothing() {
        let tree: BvhTree<3> = BvhTree::build(std::iter::empty());
        assert!(tree.is_empty());
        let segment = RaySegment::unbounded(Vec3::zero(), vec3(1.0, 0.0, 0.0));
        assert!(tree.hit_record(&Euclidean3, &segment, 0.0).is_none());
    }

    #[test]
    fn interior_bounds_enclose_children() {
        let spheres = random_spheres(64);
        let tree = BvhTree::build(spheres.iter().map(|s| s as &dyn Entity<3>));
        fn check<const N: usize>(node: &BvhNode<'_, N>) {
            if let BvhNode::Interior {
                left,
                right,
                bounds,
            } = node
            {
                for child in [left.as_ref(), right.as_ref()] {
                    if let Some(inner) = child.bounds() {
                        let union = Aabb::surrounding(bounds, &inner);
                        assert_eq!(union, *bounds);
                    }
                    check(child);
                }
            }
        }
        check(&tree.root);
    }
}
