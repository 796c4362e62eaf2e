use crate::geometry::{Geometry, ManifoldRay};
use crate::math::{embedded_vector, rad_from_deg, Scalar, Vec3, Vec4, VecN};

// ─── Camera ─────────────────────────────────────────────────────────────────

/// Maps canvas coordinates `(x, y) ∈ [−1, +1]²` to rays on the manifold.
pub trait Camera<const N: usize>: Send + Sync {
    /// Cameras may be animated (e.g. a detector that records its own
    /// exposure time); static cameras ignore this.
    fn set_time(&mut self, _time: Scalar) {}

    /// The ray leaving the detector for the given canvas coordinates.
    fn ray_for_coords<'a>(
        &self,
        geometry: &'a dyn Geometry<N>,
        x: Scalar,
        y: Scalar,
    ) -> Box<dyn ManifoldRay<N> + 'a>;
}

// ─── Pinhole Camera ─────────────────────────────────────────────────────────

/// The pinhole model: a detector surface parameterized over `[−1, +1]²` and
/// a pinhole point. Each canvas coordinate picks a point on the detector
/// and the emitted ray passes from there through the pinhole — which the
/// geometry resolves into an actual (possibly curved) ray.
pub struct PinholeCamera<const N: usize> {
    detector_surface: Box<dyn Fn(Scalar, Scalar) -> VecN<N> + Send + Sync>,
    pinhole: VecN<N>,
}

impl<const N: usize> PinholeCamera<N> {
    pub fn new(
        detector_surface: impl Fn(Scalar, Scalar) -> VecN<N> + Send + Sync + 'static,
        pinhole: VecN<N>,
    ) -> Self {
        Self {
            detector_surface: Box::new(detector_surface),
            pinhole,
        }
    }
}

impl<const N: usize> Camera<N> for PinholeCamera<N> {
    fn ray_for_coords<'a>(
        &self,
        geometry: &'a dyn Geometry<N>,
        x: Scalar,
        y: Scalar,
    ) -> Box<dyn ManifoldRay<N> + 'a> {
        let start = (self.detector_surface)(x, y);
        geometry.ray_passing_through(start, self.pinhole)
    }
}

impl PinholeCamera<3> {
    /// Pinhole camera from conventional parameters in Cartesian
    /// coordinates. For convenience the image is flipped vertically, unlike
    /// a real pinhole image.
    pub fn cartesian(
        detector_origin: Vec3,
        pinhole: Vec3,
        up_direction: Vec3,
        vertical_field_of_view_deg: Scalar,
        aspect_ratio: Scalar,
    ) -> Self {
        pinhole_camera_embedded::<3>(
            detector_origin,
            pinhole,
            up_direction,
            vertical_field_of_view_deg,
            aspect_ratio,
        )
    }
}

/// Pinhole camera for flat embedded `N`-dimensional geometries: the 3D
/// construction zero-padded into the higher dimension.
pub fn pinhole_camera_embedded<const N: usize>(
    detector_origin: Vec3,
    pinhole: Vec3,
    up_direction: Vec3,
    vertical_field_of_view_deg: Scalar,
    aspect_ratio: Scalar,
) -> PinholeCamera<N> {
    let theta = rad_from_deg(vertical_field_of_view_deg);
    let viewport_height = 2.0 * (theta / 2.0).tan();
    let viewport_width = aspect_ratio * viewport_height;

    let w = (pinhole - detector_origin).unit();
    let u = up_direction.cross(w).unit();
    let v = u.cross(w);
    let focus_distance = (pinhole - detector_origin).length();

    let x_span = u * (focus_distance * viewport_width / 2.0);
    let y_span = v * (focus_distance * viewport_height / 2.0);
    let z_span = w * focus_distance;

    // the pinhole sits at focus distance in front of the detector center
    let pinhole_point = embedded_vector::<N, 0, 3>(detector_origin + z_span);
    PinholeCamera::new(
        move |x, y| embedded_vector::<N, 0, 3>(detector_origin + x_span * x + y_span * y),
        pinhole_point,
    )
}

// ─── Perspective Camera for Spacetimes ──────────────────────────────────────

/// Perspective camera for 4D spacetime geometries (Minkowski,
/// Schwarzschild), where `ray_passing_through` is unavailable or
/// meaningless. It stores the detector basis directly and emits rays via
/// `ray_from`, with the time component of the direction fixed to `−1/c`
/// (looking back along the light cone) and the start advanced to the
/// current scene time.
pub struct PerspectiveCamera4 {
    pub position: Vec4,
    pub direction_u: Vec4,
    pub direction_v: Vec4,
    pub direction_z: Vec4,
    pub speed_of_light: Scalar,
    time: Scalar,
}

impl PerspectiveCamera4 {
    /// Builds the camera from conventional 3D parameters, embedded into the
    /// spatial slice of the spacetime. "Far" refers to the focal plane
    /// passing through `focus`.
    pub fn far_perspective(
        position: Vec3,
        focus: Vec3,
        up_direction: Vec3,
        vertical_field_of_view_deg: Scalar,
        aspect_ratio: Scalar,
        speed_of_light: Scalar,
    ) -> Self {
        let theta = rad_from_deg(vertical_field_of_view_deg);
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = aspect_ratio * viewport_height;

        let w = (focus - position).unit();
        let u = up_direction.cross(w).unit();
        let v = u.cross(w);
        let focus_distance = (focus - position).length();

        let x_span = u * (focus_distance * viewport_width / 2.0);
        let y_span = v * (focus_distance * viewport_height / 2.0);
        let z_span = w * focus_distance;

        Self {
            position: embedded_vector::<4, 0, 3>(position),
            direction_u: embedded_vector::<4, 0, 3>(x_span),
            direction_v: embedded_vector::<4, 0, 3>(y_span),
            direction_z: embedded_vector::<4, 0, 3>(z_span),
            speed_of_light,
            time: 0.0,
        }
    }
}

impl Camera<4> for PerspectiveCamera4 {
    fn set_time(&mut self, time: Scalar) {
        self.time = time;
    }

    fn ray_for_coords<'a>(
        &self,
        geometry: &'a dyn Geometry<4>,
        x: Scalar,
        y: Scalar,
    ) -> Box<dyn ManifoldRay<4> + 'a> {
        let time_axis = Vec4::base(3);
        let start = self.position + time_axis * self.time;
        let direction = self.direction_z + self.direction_u * x + self.direction_v * y
            - time_axis * (1.0 / self.speed_of_light);
        geometry.ray_from(start, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Euclidean3, Minkowski};
    use crate::math::vec3;
    use approx::assert_relative_eq;

    #[test]
    fn center_ray_points_at_the_pinhole() {
        let camera = PinholeCamera::cartesian(
            vec3(0.0, 0.0, 5.0),
            vec3(0.0, 0.0, 4.0),
            vec3(0.0, 1.0, 0.0),
            90.0,
            1.0,
        );
        let mut ray = camera.ray_for_coords(&Euclidean3, 0.0, 0.0);
        let segment = ray.next_ray_segment().unwrap();
        assert_relative_eq!(segment.direction[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(segment.direction[1], 0.0, epsilon = 1e-12);
        assert!(segment.direction[2] < 0.0);
    }

    #[test]
    fn corner_rays_tilt_away_from_the_axis() {
        let camera = PinholeCamera::cartesian(
            vec3(0.0, 0.0, 5.0),
            vec3(0.0, 0.0, 4.0),
            vec3(0.0, 1.0, 0.0),
            90.0,
            1.0,
        );
        let mut ray = camera.ray_for_coords(&Euclidean3, 1.0, 0.0);
        let segment = ray.next_ray_segment().unwrap();
        assert!(segment.direction[0].abs() > 1e-6);
    }

    #[test]
    fn spacetime_camera_starts_at_the_current_time() {
        let geometry = Minkowski::new(1.0);
        let mut camera = PerspectiveCamera4::far_perspective(
            vec3(0.0, 0.0, 3.0),
            vec3(0.0, 0.0, -3.0),
            vec3(0.0, 1.0, 0.0),
            90.0,
            1.0,
            1.0,
        );
        camera.set_time(2.0);
        let mut ray = camera.ray_for_coords(&geometry, 0.0, 0.0);
        let segment = ray.next_ray_segment().unwrap();
        assert_relative_eq!(segment.start[3], 2.0, epsilon = 1e-12);
        assert_relative_eq!(segment.direction[3], -1.0, epsilon = 1e-12);
    }
}
