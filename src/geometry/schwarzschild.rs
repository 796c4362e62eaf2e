use super::geodesic::{CurvedGeometry, GeodesicRay, RayIntegration};
use super::{Geometry, ManifoldRay};
use crate::math::{christoffel_second_kind, Mat, Scalar, Ten3, Vec4};

// ─── Schwarzschild Spacetime ────────────────────────────────────────────────

/// The Schwarzschild black-hole spacetime in Cartesian-like coordinates
/// `(x, y, z, t)`. With `r² = x² + y² + z²` and `Rs` the Schwarzschild
/// radius, the metric is
///
/// ```text
///   g_ij = δ_ij + w(r)·x_i·x_j      w(r) = Rs / (r²·(r − Rs))
///   g_tt = −c²·(1 − Rs/r)
/// ```
///
/// Both the inverse metric and the metric derivatives are known in closed
/// form (the spatial block inverts by Sherman–Morrison to
/// `δ_ij − (Rs/r³)·x_i·x_j`), so the Christoffel symbols are evaluated
/// exactly from `Γ_{c,ab} = ½(∂_a g_cb + ∂_b g_ca − ∂_c g_ab)` rather than
/// through a forest of expanded expressions.
///
/// Valid outside the horizon only (`r > Rs`); rays that fall in terminate
/// through the integrator's non-finite checks.
pub struct Schwarzschild {
    speed_of_light: Scalar,
    schwarzschild_radius: Scalar,
    integration: RayIntegration,
}

impl Schwarzschild {
    pub fn new(
        speed_of_light: Scalar,
        schwarzschild_radius: Scalar,
        integration: RayIntegration,
    ) -> Self {
        Self {
            speed_of_light,
            schwarzschild_radius,
            integration,
        }
    }

    pub fn speed_of_light(&self) -> Scalar {
        self.speed_of_light
    }

    pub fn schwarzschild_radius(&self) -> Scalar {
        self.schwarzschild_radius
    }

    /// Inverse metric in closed form.
    pub fn inverse_metric(&self, position: Vec4) -> Mat<4, 4> {
        let c = self.speed_of_light;
        let rs = self.schwarzschild_radius;
        let x = [position[0], position[1], position[2]];
        let r2 = x[0] * x[0] + x[1] * x[1] + x[2] * x[2];
        let r = r2.sqrt();
        let w_inv = rs / (r2 * r);

        let mut rows = [[0.0; 4]; 4];
        for i in 0..3 {
            for j in 0..3 {
                rows[i][j] = -w_inv * x[i] * x[j];
            }
            rows[i][i] += 1.0;
        }
        rows[3][3] = -r / (c * c * (r - rs));
        Mat::from_rows(rows)
    }

    /// Partial derivatives `∂_k g` of the metric for `k = 0..3`; the time
    /// derivative vanishes because the spacetime is static.
    fn metric_derivatives(&self, position: Vec4) -> [Mat<4, 4>; 4] {
        let c = self.speed_of_light;
        let rs = self.schwarzschild_radius;
        let x = [position[0], position[1], position[2]];
        let r2 = x[0] * x[0] + x[1] * x[1] + x[2] * x[2];
        let r = r2.sqrt();
        let r3 = r2 * r;

        // w(r) = Rs / (r³ − r²·Rs)
        let denominator = r3 - r2 * rs;
        let w = rs / denominator;
        let dw_dr = -rs * (3.0 * r2 - 2.0 * r * rs) / (denominator * denominator);
        // ∂_k g_tt = −c²·Rs·x_k / r³
        let dgtt_factor = -c * c * rs / r3;

        let mut derivatives = [Mat::zero(); 4];
        for k in 0..3 {
            let mut rows = [[0.0; 4]; 4];
            let radial = dw_dr * x[k] / r;
            for i in 0..3 {
                for j in 0..3 {
                    rows[i][j] = radial * x[i] * x[j];
                }
                rows[i][k] += w * x[i];
                rows[k][i] += w * x[i];
            }
            rows[3][3] = dgtt_factor * x[k];
            derivatives[k] = Mat::from_rows(rows);
        }
        derivatives
    }

    /// Christoffel symbols of the first kind `Γ_{c,ab}`.
    pub fn christoffel_1(&self, position: Vec4) -> Ten3<4> {
        let dg = self.metric_derivatives(position);
        let mut slices = [Mat::zero(); 4];
        for (c, slice) in slices.iter_mut().enumerate() {
            let mut rows = [[0.0; 4]; 4];
            for (a, row) in rows.iter_mut().enumerate() {
                for (b, value) in row.iter_mut().enumerate() {
                    *value = 0.5 * (dg[a][c][b] + dg[b][c][a] - dg[c][a][b]);
                }
            }
            *slice = Mat::from_rows(rows);
        }
        Ten3::from_slices(slices)
    }
}

impl Geometry<4> for Schwarzschild {
    fn ray_from<'a>(&'a self, start: Vec4, direction: Vec4) -> Box<dyn ManifoldRay<4> + 'a> {
        Box::new(GeodesicRay::new(self, start, direction))
    }

    fn ray_passing_through<'a>(
        &'a self,
        _start: Vec4,
        _target: Vec4,
    ) -> Box<dyn ManifoldRay<4> + 'a> {
        // no closed-form connecting geodesic exists; cameras for this
        // geometry construct their rays via `ray_from`
        unimplemented!("Schwarzschild geometry has no ray_passing_through")
    }

    fn to_onb_jacobian(&self, position: Vec4) -> Mat<3, 4> {
        let rs = self.schwarzschild_radius;
        let x = position[0];
        let y = position[1];
        let z = position[2];
        let r2 = x * x + y * y + z * z;
        let r = r2.sqrt();
        let rho = (x * x + y * y).sqrt();
        let alpha = (1.0 - rs / r).powf(-0.5);

        // Cartesian to spherical contravariant Jacobian and normalization
        Mat::from_rows([
            [x / (r * alpha), (x * z) / (rho * alpha), -y / alpha, 0.0],
            [y / r2, (y * z) / (r * rho), x / r, 0.0],
            [z / (r * rho), -1.0, 0.0, 0.0],
        ])
    }

    fn from_onb_jacobian(&self, position: Vec4) -> Mat<4, 3> {
        let rs = self.schwarzschild_radius;
        let x = position[0];
        let y = position[1];
        let z = position[2];
        let r2 = x * x + y * y + z * z;
        let r = r2.sqrt();
        let rho2 = x * x + y * y;
        let rho = rho2.sqrt();
        let alpha = (1.0 - rs / r).powf(-0.5);

        // denormalize and spherical to Cartesian contravariant Jacobian
        Mat::from_rows([
            [(alpha * x) / r, y, (rho * z) / r],
            [alpha * x * z / (rho * r2), (y * z) / (rho * r), -rho2 / r2],
            [(-alpha * y) / rho2, (r * x) / rho2, 0.0],
            [0.0, 0.0, 0.0],
        ])
    }

    fn metric(&self, position: Vec4) -> Mat<4, 4> {
        let c = self.speed_of_light;
        let rs = self.schwarzschild_radius;
        let x = [position[0], position[1], position[2]];
        let r2 = x[0] * x[0] + x[1] * x[1] + x[2] * x[2];
        let r = r2.sqrt();
        let w = rs / (r2 * (r - rs));

        let mut rows = [[0.0; 4]; 4];
        for i in 0..3 {
            for j in 0..3 {
                rows[i][j] = w * x[i] * x[j];
            }
            rows[i][i] += 1.0;
        }
        rows[3][3] = c * c * (-1.0 + rs / r);
        Mat::from_rows(rows)
    }
}

impl CurvedGeometry<4> for Schwarzschild {
    fn christoffel_2(&self, position: Vec4) -> Ten3<4> {
        christoffel_second_kind(self.inverse_metric(position), self.christoffel_1(position))
    }

    fn ray_integration(&self) -> &RayIntegration {
        &self.integration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4;
    use approx::assert_relative_eq;

    fn sample_geometry() -> Schwarzschild {
        Schwarzschild::new(
            1.0,
            1.0,
            RayIntegration::new(0.1, 1e-8, 1e-8, 100.0, 1.1).unwrap(),
        )
    }

    fn sample_points() -> Vec<Vec4> {
        vec![
            vec4(3.0, 1.0, -2.0, 0.0),
            vec4(-5.0, 2.0, 1.0, 7.0),
            vec4(0.5, -4.0, 3.0, -1.0),
        ]
    }

    #[test]
    fn metric_matches_the_componentwise_form() {
        let geometry = sample_geometry();
        let p = vec4(2.0, 0.0, 0.0, 0.0);
        let g = geometry.metric(p);
        // on the x-axis at r = 2 with Rs = 1: g_xx = x²/(r² − r·Rs) = 2
        assert_relative_eq!(g[0][0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(g[1][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(g[2][2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(g[3][3], -0.5, epsilon = 1e-12);
        assert_relative_eq!(g[0][1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn metric_times_inverse_is_identity() {
        let geometry = sample_geometry();
        for p in sample_points() {
            let product = geometry.metric(p) * geometry.inverse_metric(p);
            for i in 0..4 {
                for j in 0..4 {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_relative_eq!(product[i][j], expected, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn metric_derivatives_match_finite_differences() {
        let geometry = sample_geometry();
        let h = 1e-6;
        for p in sample_points() {
            let dg = geometry.metric_derivatives(p);
            for k in 0..4 {
                let mut fwd = p;
                let mut bwd = p;
                fwd[k] += h;
                bwd[k] -= h;
                let numeric = (geometry.metric(fwd) - geometry.metric(bwd)) * (0.5 / h);
                for i in 0..4 {
                    for j in 0..4 {
                        assert_relative_eq!(dg[k][i][j], numeric[i][j], epsilon = 1e-5);
                    }
                }
            }
        }
    }

    #[test]
    fn christoffel_1_is_symmetric_in_the_lower_indices() {
        let geometry = sample_geometry();
        for p in sample_points() {
            let chris = geometry.christoffel_1(p);
            for c in 0..4 {
                for a in 0..4 {
                    for b in 0..4 {
                        assert_relative_eq!(chris[c][a][b], chris[c][b][a], epsilon = 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn onb_jacobians_are_mutual_pseudo_inverses() {
        let geometry = sample_geometry();
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
    fn light_bends_toward_the_mass() {
        // a ray passing the hole at impact parameter 5 must bend toward the
        // origin: the angle between the first and the latest segment
        // direction increases monotonically through the passage
        let geometry = Schwarzschild::new(
            100.0,
            1.0,
            RayIntegration::new(0.1, 1e-12, 1e-12, 200.0, 1.0).unwrap(),
        );
        let start = vec4(0.0, 5.0, -50.0, 0.0);
        let target = vec4(0.0, 5.0, 0.0, 0.0);
        let spatial = vec4(
            target[0] - start[0],
            target[1] - start[1],
            target[2] - start[2],
            -1.0 / 100.0,
        );
        let direction = geometry.normalize(start, spatial);
        let mut ray = geometry.ray_from(start, direction);

        let first = ray
            .next_ray_segment()
            .expect("ray must start")
            .direction;
        let spatial_unit = |d: Vec4| {
            let v = crate::math::vec3(d[0], d[1], d[2]);
            v.unit()
        };
        let first_spatial = spatial_unit(first);

        let mut last_angle: Scalar = 0.0;
        let mut count = 0;
        while let Some(segment) = ray.next_ray_segment() {
            let angle = first_spatial
                .dot(spatial_unit(segment.direction))
                .clamp(-1.0, 1.0)
                .acos();
            assert!(
                angle >= last_angle - 1e-7,
                "deflection must grow monotonically"
            );
            last_angle = angle;
            count += 1;
            if count > 5000 {
                break;
            }
        }
        assert!(count > 3, "expected several integration segments");
        assert!(last_angle > 1e-4, "expected measurable deflection");
    }
}
