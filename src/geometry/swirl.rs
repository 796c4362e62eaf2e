use super::geodesic::{CurvedGeometry, GeodesicRay, RayIntegration};
use super::{Geometry, ManifoldRay};
use crate::math::{christoffel_second_kind, Mat, Mat3, Scalar, Ten3, Vec3, VecN};

// ─── Swirl Geometry ─────────────────────────────────────────────────────────

/// Curved 3D geometry in Cartesian-like coordinates `(u, v, z)` related to
/// flat space by a height- and radius-dependent twist of the azimuthal
/// angle: `φ = atan2(v, u) + a·r·z` with swirl strength `a`. For `a = 0`
/// the geometry is Euclidean; the metric, its inverse, the ONB Jacobians
/// and the Christoffel symbols are all known in closed form.
pub struct Swirl {
    swirl_strength: Scalar,
    integration: RayIntegration,
}

impl Swirl {
    pub fn new(swirl_strength: Scalar, integration: RayIntegration) -> Self {
        Self {
            swirl_strength,
            integration,
        }
    }

    pub fn swirl_strength(&self) -> Scalar {
        self.swirl_strength
    }

    /// Inverse metric in closed form.
    pub fn inverse_metric(&self, position: Vec3) -> Mat3 {
        let a = self.swirl_strength;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r = (u * u + v * v).sqrt();
        let s = u * u - v * v;
        let u2v2z2 = u * u + v * v + z * z;

        Mat::from_rows([
            [
                1.0 + a * v * ((2.0 * u * z) / r + a * v * (r * r + z * z)),
                a * ((-s * z) / r - a * u * v * u2v2z2),
                a * v * r,
            ],
            [
                a * ((-s * z) / r - a * u * v * u2v2z2),
                1.0 + a * u * ((-2.0 * v * z) / r + a * u * u2v2z2),
                -a * u * r,
            ],
            [a * v * r, -a * u * r, 1.0],
        ])
    }

    /// Christoffel symbols of the first kind `Γ_{c,ab}`.
    pub fn christoffel_1(&self, position: Vec3) -> Ten3<3> {
        let a = self.swirl_strength;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r = (u * u + v * v).sqrt();

        let arz = a * r * z;
        let a2r2 = a * a * r * r;
        let a2r3 = a * a * r * r * r;

        let alpha = Scalar::atan2(v, u);

        let cos_alpha = alpha.cos();
        let sin_alpha = alpha.sin();
        let cos_2alpha = (2.0 * alpha).cos();
        let sin_2alpha = (2.0 * alpha).sin();
        let cos_3alpha = (3.0 * alpha).cos();
        let sin_3alpha = (3.0 * alpha).sin();

        let cos3_alpha = cos_alpha.powi(3);
        let sin3_alpha = sin_alpha.powi(3);

        Ten3::from_slices([
            Mat::from_rows([
                [
                    a * z * (arz * cos_alpha - sin3_alpha),
                    -a * z * cos3_alpha,
                    a * r * cos_alpha * (arz * cos_alpha - sin_alpha),
                ],
                [
                    -a * z * cos3_alpha,
                    -0.25 * a * z * (-4.0 * arz * cos_alpha + 9.0 * sin_alpha + sin_3alpha),
                    0.5 * a * r * (-3.0 + cos_2alpha + arz * sin_2alpha),
                ],
                [
                    a * r * cos_alpha * (arz * cos_alpha - sin_alpha),
                    0.5 * a * r * (-3.0 + cos_2alpha + arz * sin_2alpha),
                    -a2r3 * cos_alpha,
                ],
            ]),
            Mat::from_rows([
                [
                    0.25 * a * z * (9.0 * cos_alpha - cos_3alpha + 4.0 * arz * sin_alpha),
                    a * z * sin3_alpha,
                    0.5 * a * r * (3.0 + cos_2alpha + arz * sin_2alpha),
                ],
                [
                    a * z * sin3_alpha,
                    a * z * (cos3_alpha + arz * sin_alpha),
                    a * r * sin_alpha * (cos_alpha + arz * sin_alpha),
                ],
                [
                    0.5 * a * r * (3.0 + cos_2alpha + arz * sin_2alpha),
                    a * r * sin_alpha * (cos_alpha + arz * sin_alpha),
                    -a2r3 * sin_alpha,
                ],
            ]),
            Mat::from_rows([
                [
                    0.5 * a2r2 * z * (3.0 + cos_2alpha),
                    a2r2 * z * cos_alpha * sin_alpha,
                    2.0 * a2r3 * cos_alpha,
                ],
                [
                    a2r2 * z * cos_alpha * sin_alpha,
                    -0.5 * a2r2 * z * (-3.0 + cos_2alpha),
                    2.0 * a2r3 * sin_alpha,
                ],
                [2.0 * a2r3 * cos_alpha, 2.0 * a2r3 * sin_alpha, 0.0],
            ]),
        ])
    }
}

impl Geometry<3> for Swirl {
    fn ray_from<'a>(&'a self, start: Vec3, direction: Vec3) -> Box<dyn ManifoldRay<3> + 'a> {
        Box::new(GeodesicRay::new(self, start, direction))
    }

    /// Analytic inverse of the swirl coordinate map: the connecting geodesic
    /// direction is known in closed form.
    fn ray_passing_through<'a>(
        &'a self,
        start: Vec3,
        target: Vec3,
    ) -> Box<dyn ManifoldRay<3> + 'a> {
        let a = self.swirl_strength;

        let u0 = start[0];
        let v0 = start[1];
        let z0 = start[2];
        let r0 = (u0 * u0 + v0 * v0).sqrt();
        let arz0 = a * r0 * z0;
        let phi0 = Scalar::atan2(v0, u0) + arz0;

        let u1 = target[0];
        let v1 = target[1];
        let z1 = target[2];
        let r1 = (u1 * u1 + v1 * v1).sqrt();
        let arz1 = a * r1 * z1;
        let phi1 = Scalar::atan2(v1, u1) + arz1;

        let direction = VecN::new([
            -r0 * (arz0 - phi0).cos() + r1 * (arz0 - phi1).cos()
                - a * r0
                    * (-2.0 * r0 * z0 + r0 * z1 + r1 * z0 * (phi1 - phi0).cos())
                    * (arz0 - phi0).sin(),
            a * r0 * r0 * (2.0 * z0 - z1) * (arz0 - phi0).cos()
                - 0.5 * arz0 * r1 * ((arz0 - phi1).cos() + (arz0 - 2.0 * phi0 + phi1).cos())
                + r0 * (arz0 - phi0).sin()
                - r1 * (arz0 - phi1).sin(),
            z1 - z0,
        ]);

        let direction = self.normalize(start, direction);
        Box::new(GeodesicRay::new(self, start, direction))
    }

    fn to_onb_jacobian(&self, position: Vec3) -> Mat<3, 3> {
        let a = self.swirl_strength;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r = (u * u + v * v).sqrt();
        // note: convention is atan2(y, x)
        let phi = Scalar::atan2(v, u) + a * r * z;
        let sphi = phi.sin();
        let cphi = phi.cos();

        Mat::from_rows([
            [
                ((u + a * v * z * r) * cphi + v * sphi) / r,
                ((u + a * v * z * r) * sphi - v * cphi) / r,
                a * v * r,
            ],
            [
                ((v - a * u * z * r) * cphi - u * sphi) / r,
                ((v - a * u * z * r) * sphi + u * cphi) / r,
                -a * u * r,
            ],
            [0.0, 0.0, 1.0],
        ])
    }

    fn from_onb_jacobian(&self, position: Vec3) -> Mat<3, 3> {
        let a = self.swirl_strength;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r = (u * u + v * v).sqrt();
        let phi = Scalar::atan2(v, u) + a * r * z;
        let sphi = phi.sin();
        let cphi = phi.cos();

        Mat::from_rows([
            [
                ((v - a * u * z * r) * sphi + u * cphi) / r,
                (-(u + a * v * z * r) * sphi + v * cphi) / r,
                -a * r * r * sphi,
            ],
            [
                ((-v + a * u * z * r) * cphi + u * sphi) / r,
                ((u + a * v * z * r) * cphi + v * sphi) / r,
                a * r * r * cphi,
            ],
            [0.0, 0.0, 1.0],
        ])
    }

    fn metric(&self, position: Vec3) -> Mat3 {
        let a = self.swirl_strength;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r = (u * u + v * v).sqrt();

        Mat::from_rows([
            [
                1.0 + a * u * z * (a * u * z - 2.0 * v / r),
                a * z * (u * u - v * v + a * u * v * z * r) / r,
                a * r * (a * u * z * r - v),
            ],
            [
                a * z * (u * u - v * v + a * u * v * z * r) / r,
                1.0 + a * v * z * (2.0 * u / r + a * v * z),
                a * (u * r + a * v * z * r * r),
            ],
            [
                a * r * (a * u * z * r - v),
                a * r * (u + a * v * z * r),
                1.0 + a * a * r * r * r * r,
            ],
        ])
    }
}

impl CurvedGeometry<3> for Swirl {
    fn christoffel_2(&self, position: Vec3) -> Ten3<3> {
        christoffel_second_kind(self.inverse_metric(position), self.christoffel_1(position))
    }

    fn ray_integration(&self) -> &RayIntegration {
        &self.integration
    }
}
