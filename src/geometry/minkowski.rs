use super::euclidean::SingleSegmentRay;
use super::{Geometry, ManifoldRay};
use crate::math::{embedded_matrix, vec3, Mat, Scalar, Vec4, VecN};

// ─── Minkowski Spacetime ────────────────────────────────────────────────────

/// Flat 4D spacetime with signature `(+, +, +, −)`: coordinates are
/// `(x, y, z, t)` and the metric is `diag(1, 1, 1, −c²)`. Light rays run on
/// the future light cone, which fixes the time component of every ray
/// direction to `−1/c` — the spatial part is what the caller chooses.
#[derive(Debug, Clone, Copy)]
pub struct Minkowski {
    pub speed_of_light: Scalar,
}

impl Minkowski {
    pub fn new(speed_of_light: Scalar) -> Self {
        Self { speed_of_light }
    }

    /// Attaches the light-cone time component to a spatial direction.
    fn light_like(&self, spatial: [Scalar; 3]) -> Vec4 {
        VecN::new([
            spatial[0],
            spatial[1],
            spatial[2],
            -1.0 / self.speed_of_light,
        ])
    }
}

impl Default for Minkowski {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Geometry<4> for Minkowski {
    fn ray_from<'a>(&'a self, start: Vec4, direction: Vec4) -> Box<dyn ManifoldRay<4> + 'a> {
        // note: only the spatial part of `direction` is honoured; the time
        //       component is fixed by the light cone
        let direction = self.light_like([direction[0], direction[1], direction[2]]);
        Box::new(SingleSegmentRay::new(start, direction))
    }

    fn ray_passing_through<'a>(
        &'a self,
        start: Vec4,
        target: Vec4,
    ) -> Box<dyn ManifoldRay<4> + 'a> {
        let spatial = vec3(
            target[0] - start[0],
            target[1] - start[1],
            target[2] - start[2],
        )
        .unit();
        let direction = self.light_like([spatial[0], spatial[1], spatial[2]]);
        Box::new(SingleSegmentRay::new(start, direction))
    }

    fn to_onb_jacobian(&self, _position: Vec4) -> Mat<3, 4> {
        embedded_matrix::<3, 4, 0, 0, 3, 3>(Mat::identity())
    }

    fn from_onb_jacobian(&self, _position: Vec4) -> Mat<4, 3> {
        embedded_matrix::<4, 3, 0, 0, 3, 3>(Mat::identity())
    }

    fn metric(&self, _position: Vec4) -> Mat<4, 4> {
        let c = self.speed_of_light;
        Mat::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, -c * c],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4;
    use approx::assert_relative_eq;

    #[test]
    fn ray_directions_live_on_the_future_light_cone() {
        let geometry = Minkowski::new(2.0);
        let mut ray = geometry.ray_from(Vec4::zero(), vec4(1.0, 0.0, 0.0, 123.0));
        let segment = ray.next_ray_segment().unwrap();
        assert_eq!(segment.direction, vec4(1.0, 0.0, 0.0, -0.5));

        // light-like: g(d, d) = |d_spatial|² − c²·(1/c)² = 0
        let g = geometry.metric(Vec4::zero());
        assert_relative_eq!(segment.direction.dot(g * segment.direction), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn passing_through_uses_the_spatial_separation() {
        let geometry = Minkowski::default();
        let mut ray =
            geometry.ray_passing_through(vec4(0.0, 0.0, 0.0, 7.0), vec4(0.0, 4.0, 3.0, -2.0));
        let segment = ray.next_ray_segment().unwrap();
        assert_relative_eq!(segment.direction[1], 0.8, epsilon = 1e-14);
        assert_relative_eq!(segment.direction[2], 0.6, epsilon = 1e-14);
        assert_relative_eq!(segment.direction[3], -1.0, epsilon = 1e-14);
    }
}
