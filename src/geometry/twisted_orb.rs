use super::geodesic::{CurvedGeometry, GeodesicRay, RayIntegration};
use super::{Geometry, ManifoldRay};
use crate::math::{christoffel_second_kind, vec3, Mat, Mat3, Scalar, Ten3, Vec3};

// ─── Twisted-Orb Geometry ───────────────────────────────────────────────────

/// Curved 3D geometry in Cartesian-like coordinates related to flat space
/// by twisting the azimuthal angle by `ψ·exp(−R/ρ)` where `R` is the
/// distance from the origin: a localized "twist bubble" of radius `ρ` and
/// maximal angle `ψ` that decays exponentially, so the geometry is
/// asymptotically flat far away.
pub struct TwistedOrb {
    twist_angle: Scalar,
    twist_radius: Scalar,
    integration: RayIntegration,
}

impl TwistedOrb {
    pub fn new(twist_angle: Scalar, twist_radius: Scalar, integration: RayIntegration) -> Self {
        Self {
            twist_angle,
            twist_radius,
            integration,
        }
    }

    pub fn twist_angle(&self) -> Scalar {
        self.twist_angle
    }

    pub fn twist_radius(&self) -> Scalar {
        self.twist_radius
    }

    /// Maps twisted-orb coordinates to flat Cartesian coordinates.
    pub fn to_cartesian_coords(&self, position: Vec3) -> Vec3 {
        let psi = self.twist_angle;
        let rho = self.twist_radius;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r = (u * u + v * v).sqrt();
        let big_r = (u * u + v * v + z * z).sqrt();
        let phi = Scalar::atan2(v, u) + psi * (-big_r / rho).exp();
        vec3(r * phi.cos(), r * phi.sin(), z)
    }

    /// Inverse metric in closed form.
    pub fn inverse_metric(&self, position: Vec3) -> Mat3 {
        let psi = self.twist_angle;
        let rho = self.twist_radius;
        let rho2 = rho * rho;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r2 = u * u + v * v + z * z;
        let big_r = r2.sqrt();
        let s = (-2.0 * big_r / rho).exp();
        let t = (big_r / rho).exp();

        let f00 = 1.0 + (-2.0 / t * u * v * rho * psi / big_r + s * v * v * psi * psi) / rho2;
        let f01 = s * psi * (t * (u - v) * (u + v) * rho / big_r - u * v * psi) / rho2;
        let f02 = (-1.0 / t) * v * z * psi / (big_r * rho);
        let f11 = 1.0 + (2.0 / t * u * v * rho * psi / big_r + s * u * u * psi * psi) / rho2;
        let f12 = (1.0 / t) * u * z * psi / (big_r * rho);
        let f22 = 1.0;

        Mat::from_rows([[f00, f01, f02], [f01, f11, f12], [f02, f12, f22]])
    }

    /// Christoffel symbols of the first kind `Γ_{c,ab}`.
    pub fn christoffel_1(&self, position: Vec3) -> Ten3<3> {
        let psi = self.twist_angle;
        let rho = self.twist_radius;
        let rho2 = rho * rho;
        let rho3 = rho2 * rho;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let u2 = u * u;
        let u4 = u2 * u2;
        let u6 = u4 * u2;
        let v2 = v * v;
        let v4 = v2 * v2;
        let v6 = v4 * v2;
        let z2 = z * z;
        let z4 = z2 * z2;
        let r2 = u * u + v * v + z * z;
        let r = r2.sqrt();
        let r5 = r2 * r2 * r;
        let t = (r / rho).exp();
        let s = (-2.0 * r / rho).exp();

        // u

        let fuuu = s * psi
            * (t * v * r2 * rho * (-u2 * r + (v2 + z2) * rho)
                - u * (u6 - v2 * (v2 + z2) * r * rho
                    + u2 * (v2 + z2) * (v2 - 2.0 * r * rho)
                    + u4 * (2.0 * v2 + z2 - r * rho))
                    * psi)
            / (r5 * rho3);

        let fuuv = -s * u * psi
            * (-t * r2 * rho * (-v2 * r + (u2 + z2) * rho)
                + u * v * (u4 + v4 + v2 * z2 + u2 * (2.0 * v2 + z2) - z2 * r * rho) * psi)
            / (r5 * rho3);

        let fuuz = -s * u * z * psi
            * (t * v * r2 * rho * (r + rho) + u * (u2 + v2) * (r2 + r * rho) * psi)
            / (r5 * rho3);

        let fuvv = s * psi
            * (t * v * r2 * rho * (-v2 * (r - 2.0 * rho) + 3.0 * (u2 + z2) * rho)
                - u * (v6 - 2.0 * v2 * z2 * r * rho
                    + u4 * (v2 - r * rho)
                    + u2 * (2.0 * v2 + z2) * (v2 - r * rho)
                    + v4 * (z2 - r * rho))
                    * psi)
            / (r5 * rho3);

        let fuvz = -s * z * psi
            * (-t * r2 * rho * (-v2 * r + (u2 + z2) * rho)
                + u * v * (u2 + v2) * (r2 + r * rho) * psi)
            / (r5 * rho3);

        let fuzz = s * psi
            * (t * v * r2 * rho * (-z2 * r + (u2 + v2) * rho)
                - u * (z4 * r * rho
                    + u4 * (z2 - r * rho)
                    + v4 * (z2 - r * rho)
                    + v2 * (z4 + z2 * r * rho)
                    + u2 * (z4 + z2 * r * rho + 2.0 * v2 * (z2 - r * rho)))
                    * psi)
            / (r5 * rho3);

        // v

        let fvuu = s * psi
            * (t * u * r2 * rho * (u2 * (r - 2.0 * rho) - 3.0 * (v2 + z2) * rho)
                - v * (u6 - v2 * (v2 + z2) * r * rho
                    + u2 * (v2 + z2) * (v2 - 2.0 * r * rho)
                    + u4 * (2.0 * v2 + z2 - r * rho))
                    * psi)
            / (r5 * rho3);

        let fvuv = -s * v * psi
            * (-t * r2 * rho * (u2 * r - (v2 + z2) * rho)
                + u * v * (u4 + v4 + v2 * z2 + u2 * (2.0 * v2 + z2) - z2 * r * rho) * psi)
            / (r5 * rho3);

        let fvuz = -s * z * psi
            * (-t * r2 * rho * (u2 * r - (v2 + z2) * rho)
                + u * v * (u2 + v2) * (r2 + r * rho) * psi)
            / (r5 * rho3);

        let fvvv = -s * psi
            * (t * u * r2 * rho * (-v2 * r + (u2 + z2) * rho)
                + v * (v6 - 2.0 * v2 * z2 * r * rho
                    + u4 * (v2 - r * rho)
                    + u2 * (2.0 * v2 + z2) * (v2 - r * rho)
                    + v4 * (z2 - r * rho))
                    * psi)
            / (r5 * rho3);

        let fvvz = s * v * z * psi
            * (t * u * r2 * rho * (r + rho) - v * (u2 + v2) * (r2 + r * rho) * psi)
            / (r5 * rho3);

        let fvzz = -s * psi
            * (t * u * r2 * rho * (-z2 * r + (u2 + v2) * rho)
                + v * (z4 * r * rho
                    + u4 * (z2 - r * rho)
                    + v4 * (z2 - r * rho)
                    + v2 * (z4 + z2 * r * rho)
                    + u2 * (z4 + z2 * r * rho + 2.0 * v2 * (z2 - r * rho)))
                    * psi)
            / (r5 * rho3);

        // z

        let fzuu = -s * z
            * (u6 - v2 * (v2 + z2) * r * rho
                + u2 * (v2 + z2) * (v2 - 3.0 * r * rho)
                + u4 * (2.0 * v2 + z2 - 2.0 * r * rho))
            * psi
            * psi
            / (r5 * rho3);

        let fzuv = -s * u * v * z
            * (u4 + v4 - 2.0 * z2 * r * rho + v2 * (z2 - r * rho) + u2 * (2.0 * v2 + z2 - r * rho))
            * psi
            * psi
            / (r5 * rho3);

        let fzuz = -s * u * z2
            * (u4 + v4 + v2 * z2 + u2 * (2.0 * v2 + z2) - z2 * r * rho)
            * psi
            * psi
            / (r5 * rho3);

        let fzvv = s * z * r
            * (-v4 * (r - 2.0 * rho) + u4 * rho + 3.0 * v2 * z2 * rho
                + u2 * (-v2 * (r - 3.0 * rho) + z2 * rho))
            * psi
            * psi
            / (r5 * rho3);

        let fzvz = -s * v * z2
            * (u4 + v4 + v2 * z2 + u2 * (2.0 * v2 + z2) - z2 * r * rho)
            * psi
            * psi
            / (r5 * rho3);

        let fzzz = -s * (u2 + v2) * z
            * (z4 + u2 * (z2 - r * rho) + v2 * (z2 - r * rho))
            * psi
            * psi
            / (r5 * rho3);

        Ten3::from_slices([
            Mat::from_rows([
                [fuuu, fuuv, fuuz],
                [fuuv, fuvv, fuvz],
                [fuuz, fuvz, fuzz],
            ]),
            Mat::from_rows([
                [fvuu, fvuv, fvuz],
                [fvuv, fvvv, fvvz],
                [fvuz, fvvz, fvzz],
            ]),
            Mat::from_rows([
                [fzuu, fzuv, fzuz],
                [fzuv, fzvv, fzvz],
                [fzuz, fzvz, fzzz],
            ]),
        ])
    }
}

impl Geometry<3> for TwistedOrb {
    fn ray_from<'a>(&'a self, start: Vec3, direction: Vec3) -> Box<dyn ManifoldRay<3> + 'a> {
        Box::new(GeodesicRay::new(self, start, direction))
    }

    /// Approximates the connecting ray by taking the straight direction in
    /// flat coordinates and pulling it back through the Jacobian at `start`.
    fn ray_passing_through<'a>(
        &'a self,
        start: Vec3,
        target: Vec3,
    ) -> Box<dyn ManifoldRay<3> + 'a> {
        let start_cartesian = self.to_cartesian_coords(start);
        let target_cartesian = self.to_cartesian_coords(target);
        let direction_cartesian = (target_cartesian - start_cartesian).unit();

        // note: the direction stays normalized under the pull-back
        let direction = self.from_onb_jacobian(start) * direction_cartesian;
        Box::new(GeodesicRay::new(self, start, direction))
    }

    fn to_onb_jacobian(&self, position: Vec3) -> Mat<3, 3> {
        let psi = self.twist_angle;
        let rho = self.twist_radius;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r2 = u * u + v * v;
        let r = r2.sqrt();
        let big_r = (u * u + v * v + z * z).sqrt();
        let t = (big_r / rho).exp();
        let phi = psi / t + Scalar::atan2(v, u);
        let cphi = phi.cos();
        let sphi = phi.sin();

        Mat::from_rows([
            [
                (u * cphi - r2 * (-v / r2 - u * psi / t / (big_r * rho)) * sphi) / r,
                (v * cphi - r2 * (u / r2 - v * psi / t / (big_r * rho)) * sphi) / r,
                (r * z * psi * sphi / t) / (big_r * rho),
            ],
            [
                (r2 * (-v / r2 - u * psi / t / (big_r * rho)) * cphi + u * sphi) / r,
                (r2 * (u / r2 - v * psi / t / (big_r * rho)) * cphi + v * sphi) / r,
                -(r * z * psi * cphi / t) / (big_r * rho),
            ],
            [0.0, 0.0, 1.0],
        ])
    }

    fn from_onb_jacobian(&self, position: Vec3) -> Mat<3, 3> {
        let psi = self.twist_angle;
        let rho = self.twist_radius;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r2 = u * u + v * v;
        let r = r2.sqrt();
        let big_r = (u * u + v * v + z * z).sqrt();
        let t = (big_r / rho).exp();
        let phi = psi / t + Scalar::atan2(v, u);
        let cphi = phi.cos();
        let sphi = phi.sin();

        Mat::from_rows([
            [
                ((u * big_r * rho - v * r2 * psi / t) * cphi + v * big_r * rho * sphi)
                    / (r * big_r * rho),
                (-v * big_r * rho * cphi + (u * big_r * rho - v * r2 * psi / t) * sphi)
                    / (r * big_r * rho),
                -v * z * psi / t / (big_r * rho),
            ],
            [
                ((v * big_r * rho + u * r2 * psi / t) * cphi - u * big_r * rho * sphi)
                    / (r * big_r * rho),
                (u * big_r * rho * cphi + (v * big_r * rho + u * r2 * psi / t) * sphi)
                    / (r * big_r * rho),
                u * z * psi / t / (big_r * rho),
            ],
            [0.0, 0.0, 1.0],
        ])
    }

    fn metric(&self, position: Vec3) -> Mat3 {
        let psi = self.twist_angle;
        let rho = self.twist_radius;
        let rho2 = rho * rho;
        let u = position[0];
        let v = position[1];
        let z = position[2];
        let r2 = u * u + v * v;
        let big_r2 = u * u + v * v + z * z;
        let big_r = big_r2.sqrt();
        let s = (-2.0 * big_r / rho).exp();
        let t = (big_r / rho).exp();

        let f00 =
            1.0 + s * u * psi * (2.0 * t * v * rho / big_r + u * r2 * psi / big_r2) / rho2;
        let f01 = s * psi * (-t * (u - v) * (u + v) * big_r * rho + u * v * r2 * psi)
            / (rho2 * big_r2);
        let f02 = s * z * psi * (t * v * big_r * rho + u * r2 * psi) / (big_r2 * rho2);
        let f11 =
            1.0 + s * v * psi * (-2.0 * t * u * rho / big_r + v * r2 * psi / big_r2) / rho2;
        let f12 = s * z * psi * (-t * u * big_r * rho + v * r2 * psi) / (big_r2 * rho2);
        let f22 = 1.0 + s * r2 * z * z * psi * psi / (big_r2 * rho2);

        Mat::from_rows([[f00, f01, f02], [f01, f11, f12], [f02, f12, f22]])
    }
}

impl CurvedGeometry<3> for TwistedOrb {
    fn christoffel_2(&self, position: Vec3) -> Ten3<3> {
        christoffel_second_kind(self.inverse_metric(position), self.christoffel_1(position))
    }

    /// Far outside the twist bubble the geometry is flat to machine
    /// precision; outbound rays can be extended straight to infinity.
    fn treat_as_infinite_segment(&self, position: Vec3, velocity: Vec3) -> bool {
        let big_r = position.length();
        let outwards = position.dot(velocity) > 0.0;
        big_r / self.twist_radius > 5.0 && outwards
    }

    fn ray_integration(&self) -> &RayIntegration {
        &self.integration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3;
    use approx::assert_relative_eq;

    fn sample_geometry(angle: Scalar) -> TwistedOrb {
        TwistedOrb::new(
            angle,
            1.0,
            RayIntegration::new(0.1, 1e-8, 1e-8, 100.0, 1.1).unwrap(),
        )
    }

    fn sample_points() -> Vec<Vec3> {
        vec![
            vec3(1.0, 0.5, -0.3),
            vec3(-0.4, 1.0, 0.8),
            vec3(0.1, -0.7, 1.5),
        ]
    }

    #[test]
    fn metric_times_inverse_is_identity() {
        let geometry = sample_geometry(0.4);
        for p in sample_points() {
            let product = geometry.metric(p) * geometry.inverse_metric(p);
            for i in 0..3 {
                for j in 0..3 {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_relative_eq!(product[i][j], expected, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn jacobians_are_mutual_inverses() {
        let geometry = sample_geometry(0.25);
        for p in sample_points() {
            let product = geometry.to_onb_jacobian(p) * geometry.from_onb_jacobian(p);
            for i in 0..3 {
                for j in 0..3 {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_relative_eq!(product[i][j], expected, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn zero_angle_is_euclidean() {
        let geometry = sample_geometry(0.0);
        for p in sample_points() {
            let metric = geometry.metric(p);
            let chris = geometry.christoffel_2(p);
            for i in 0..3 {
                for j in 0..3 {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_relative_eq!(metric[i][j], expected, epsilon = 1e-12);
                    for k in 0..3 {
                        assert_relative_eq!(chris[i][j][k], 0.0, epsilon = 1e-12);
                    }
                }
            }
            let c = geometry.to_cartesian_coords(p);
            for i in 0..3 {
                assert_relative_eq!(c[i], p[i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn far_outbound_rays_become_straight() {
        let geometry = sample_geometry(1.0);
        assert!(geometry.treat_as_infinite_segment(vec3(6.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)));
        assert!(!geometry.treat_as_infinite_segment(vec3(6.0, 0.0, 0.0), vec3(-1.0, 0.0, 0.0)));
        assert!(!geometry.treat_as_infinite_segment(vec3(1.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)));
    }

    #[test]
    fn coordinate_map_preserves_radius_and_height() {
        let geometry = sample_geometry(0.7);
        for p in sample_points() {
            let c = geometry.to_cartesian_coords(p);
            let r_in = (p[0] * p[0] + p[1] * p[1]).sqrt();
            let r_out = (c[0] * c[0] + c[1] * c[1]).sqrt();
            assert_relative_eq!(r_in, r_out, epsilon = 1e-12);
            assert_relative_eq!(p[2], c[2], epsilon = 1e-12);
        }
    }
}
