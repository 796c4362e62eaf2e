//! Material scattering.
//!
//! Materials never see the manifold: they operate on 3D vectors in the
//! local orthonormal frame of the hit point, exactly as they would in flat
//! space. The renderer converts the incoming ray direction with the
//! `to_onb` Jacobian, and converts the scattered direction back with the
//! `from_onb` Jacobian before the next bounce is traced.

use crate::color::Color;
use crate::ident::MaterialId;
use crate::math::{Scalar, Vec3};
use crate::random::{random_scalar, random_vec_inside_unit_sphere, random_unit_vec};
use crate::texture::{missing_texture_value, Texture};
use crate::world::HitRecord;
use std::sync::Arc;

// ─── Material Contract ──────────────────────────────────────────────────────

/// Scattering behaviour of a surface (or volume). Given the hit record and
/// the incoming ray direction in the local orthonormal frame, returns the
/// outgoing direction and the attenuation color. A zero outgoing direction
/// marks an emitter: the attenuation is emitted radiance and the path
/// terminates.
pub trait Material<const N: usize>: Send + Sync {
    fn scatter(&self, record: &HitRecord<'_, N>, onb_ray_direction: Vec3) -> (Vec3, Color);
}

fn texture_value<const N: usize>(
    texture: &Option<Arc<dyn Texture<N>>>,
    record: &HitRecord<'_, N>,
) -> Color {
    match texture {
        Some(texture) => texture.value(record.uv_coordinates, record.point),
        None => missing_texture_value(record.uv_coordinates),
    }
}

// ─── Emitter ────────────────────────────────────────────────────────────────

/// Emits its texture value and terminates the path.
pub struct Emitter<const N: usize> {
    pub id: MaterialId,
    pub color: Option<Arc<dyn Texture<N>>>,
}

impl<const N: usize> Emitter<N> {
    pub fn new(color: Arc<dyn Texture<N>>) -> Self {
        Self {
            id: MaterialId::default(),
            color: Some(color),
        }
    }
}

impl<const N: usize> Material<N> for Emitter<N> {
    fn scatter(&self, record: &HitRecord<'_, N>, _onb_ray_direction: Vec3) -> (Vec3, Color) {
        (Vec3::zero(), texture_value(&self.color, record))
    }
}

// ─── Diffuse ────────────────────────────────────────────────────────────────

/// Lambertian surface: scatters into the unit sphere around the normal.
pub struct Diffuse<const N: usize> {
    pub id: MaterialId,
    pub color: Option<Arc<dyn Texture<N>>>,
}

impl<const N: usize> Diffuse<N> {
    /// Antiparallel random vectors would cancel the normal; below this the
    /// scatter direction falls back to the normal itself.
    const EPSILON: Scalar = 1.0e-12;

    pub fn new(color: Arc<dyn Texture<N>>) -> Self {
        Self {
            id: MaterialId::default(),
            color: Some(color),
        }
    }
}

impl<const N: usize> Material<N> for Diffuse<N> {
    fn scatter(&self, record: &HitRecord<'_, N>, _onb_ray_direction: Vec3) -> (Vec3, Color) {
        let mut direction = record.onb_normal + random_unit_vec::<3>();
        if direction.near_zero(Self::EPSILON) {
            direction = record.onb_normal;
        }
        (direction, texture_value(&self.color, record))
    }
}

// ─── Metal ──────────────────────────────────────────────────────────────────

/// Reflecting surface with an optional rough microstructure.
pub struct Metal<const N: usize> {
    pub id: MaterialId,
    pub color: Option<Arc<dyn Texture<N>>>,
    pub roughness: Scalar,
}

impl<const N: usize> Metal<N> {
    pub fn new(color: Arc<dyn Texture<N>>, roughness: Scalar) -> Self {
        Self {
            id: MaterialId::default(),
            color: Some(color),
            roughness,
        }
    }
}

impl<const N: usize> Material<N> for Metal<N> {
    fn scatter(&self, record: &HitRecord<'_, N>, onb_ray_direction: Vec3) -> (Vec3, Color) {
        // split into components parallel and orthogonal to the normal and
        // flip the parallel part
        let parallel = record.onb_normal * record.onb_normal.dot(onb_ray_direction);
        let orthogonal = onb_ray_direction - parallel;
        let direction =
            orthogonal - parallel + random_vec_inside_unit_sphere::<3>() * self.roughness;
        (direction, texture_value(&self.color, record))
    }
}

// ─── Dielectric ─────────────────────────────────────────────────────────────

/// Clear refracting medium (glass, water). Assumes vacuum-to-medium
/// transitions only; `front_face` decides which side of the interface the
/// ray is on.
pub struct Dielectric<const N: usize> {
    pub id: MaterialId,
    pub color: Option<Arc<dyn Texture<N>>>,
    pub index_of_refraction: Scalar,
}

impl<const N: usize> Dielectric<N> {
    pub fn new(color: Arc<dyn Texture<N>>, index_of_refraction: Scalar) -> Self {
        Self {
            id: MaterialId::default(),
            color: Some(color),
            index_of_refraction,
        }
    }

    /// Schlick's approximation of the Fresnel reflectance.
    fn reflectance(cos_theta: Scalar, refraction_ratio: Scalar) -> Scalar {
        let mut r0 = (1.0 - refraction_ratio) / (1.0 + refraction_ratio);
        r0 *= r0;
        r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
    }
}

impl<const N: usize> Material<N> for Dielectric<N> {
    fn scatter(&self, record: &HitRecord<'_, N>, onb_ray_direction: Vec3) -> (Vec3, Color) {
        let refraction_ratio = if record.front_face {
            1.0 / self.index_of_refraction
        } else {
            self.index_of_refraction
        };
        let unit_direction = onb_ray_direction.unit();
        let cos_theta = -record.onb_normal.dot(unit_direction);
        let sin_theta_squared = (1.0 - cos_theta * cos_theta).abs();

        let parallel = record.onb_normal * -cos_theta;
        let orthogonal = unit_direction - parallel;

        // Snell's law: no transmitted solution above the critical angle
        let cannot_refract = refraction_ratio * refraction_ratio * sin_theta_squared > 1.0;
        let reflects = cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > random_scalar(0.0, 1.0);

        let direction = if reflects {
            orthogonal - parallel
        } else {
            let orthogonal = orthogonal * refraction_ratio;
            let parallel =
                record.onb_normal * -(1.0 - orthogonal.length_squared()).abs().sqrt();
            orthogonal + parallel
        };

        (direction, texture_value(&self.color, record))
    }
}

// ─── Isotropic ──────────────────────────────────────────────────────────────

/// Scatters uniformly into all directions — the phase function of constant
/// density mist.
pub struct Isotropic<const N: usize> {
    pub id: MaterialId,
    pub color: Option<Arc<dyn Texture<N>>>,
}

impl<const N: usize> Isotropic<N> {
    pub fn new(color: Arc<dyn Texture<N>>) -> Self {
        Self {
            id: MaterialId::default(),
            color: Some(color),
        }
    }
}

impl<const N: usize> Material<N> for Isotropic<N> {
    fn scatter(&self, record: &HitRecord<'_, N>, _onb_ray_direction: Vec3) -> (Vec3, Color) {
        (
            random_vec_inside_unit_sphere::<3>(),
            texture_value(&self.color, record),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{vec2, vec3, Mat, VecN};
    use crate::texture::ConstantColor;
    use approx::assert_relative_eq;

    fn white() -> Arc<dyn Texture<3>> {
        Arc::new(ConstantColor::new(Color::WHITE))
    }

    fn record_with_normal(normal: Vec3, front_face: bool) -> HitRecord<'static, 3> {
        HitRecord {
            t: 1.0,
            point: VecN::zero(),
            to_onb_jacobian: Mat::identity(),
            from_onb_jacobian: Mat::identity(),
            onb_normal: normal,
            uv_coordinates: vec2(0.0, 0.0),
            material: None,
            front_face,
        }
    }

    #[test]
    fn emitter_returns_a_zero_direction() {
        let emitter = Emitter::new(white());
        let record = record_with_normal(vec3(0.0, 0.0, 1.0), true);
        let (direction, color) = emitter.scatter(&record, vec3(0.0, 0.0, -1.0));
        assert!(direction.near_zero(1e-12));
        assert_eq!(color, Color::WHITE);
    }

    #[test]
    fn diffuse_scatters_into_the_normal_hemisphere() {
        let diffuse = Diffuse::new(white());
        let record = record_with_normal(vec3(0.0, 0.0, 1.0), true);
        for _ in 0..100 {
            let (direction, _) = diffuse.scatter(&record, vec3(0.0, 0.0, -1.0));
            // normal + unit vector can graze the surface but never flips
            assert!(direction[2] > -1e-9);
            assert!(!direction.near_zero(1e-12));
        }
    }

    #[test]
    fn smooth_metal_reflects_exactly() {
        let metal = Metal::new(white(), 0.0);
        let record = record_with_normal(vec3(0.0, 0.0, 1.0), true);
        let incoming = vec3(1.0, 0.0, -1.0).unit();
        let (direction, _) = metal.scatter(&record, incoming);
        assert_relative_eq!(direction[0], incoming[0], epsilon = 1e-12);
        assert_relative_eq!(direction[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(direction[2], -incoming[2], epsilon = 1e-12);
    }

    #[test]
    fn dielectric_total_internal_reflection() {
        // ray inside the medium, grazing the surface: sin²θ·η² > 1 forces a
        // reflection with the normal component flipped
        let glass = Dielectric::new(white(), 1.5);
        let record = record_with_normal(vec3(-1.0, 0.0, 0.0), false);
        // sin²θ = 0.8, η² = 2.25: well beyond the critical angle
        let incoming = vec3(1.0, 2.0, 0.0).unit();
        let (direction, _) = glass.scatter(&record, incoming);
        let unit = direction.unit();
        assert_relative_eq!(unit[0], -incoming[0], epsilon = 1e-12);
        assert_relative_eq!(unit[1], incoming[1], epsilon = 1e-12);
    }

    #[test]
    fn dielectric_refracts_at_normal_incidence() {
        // straight-on entry from outside: never reflected by Schlick
        // (R₀ = 0.04 < 1 can reflect, so force the cosine to 1 where the
        // reflectance is exactly R₀) — sample repeatedly and expect both
        // refractions and occasional reflections to be physical directions
        let glass = Dielectric::new(white(), 1.5);
        let record = record_with_normal(vec3(0.0, 0.0, 1.0), true);
        let incoming = vec3(0.0, 0.0, -1.0);
        for _ in 0..100 {
            let (direction, _) = glass.scatter(&record, incoming);
            let unit = direction.unit();
            // at normal incidence both branches keep the ray on the z axis
            assert_relative_eq!(unit[0], 0.0, epsilon = 1e-9);
            assert_relative_eq!(unit[1], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn isotropic_scatters_everywhere() {
        let isotropic = Isotropic::new(white());
        let record = record_with_normal(vec3(0.0, 0.0, 1.0), true);
        let mut down = 0;
        for _ in 0..1000 {
            let (direction, _) = isotropic.scatter(&record, vec3(0.0, 0.0, -1.0));
            if direction[2] < 0.0 {
                down += 1;
            }
        }
        // roughly half the samples leave through the surface
        assert!(down > 300 && down < 700);
    }

    #[test]
    fn missing_texture_shows_the_checker_sentinel() {
        let diffuse: Diffuse<3> = Diffuse {
            id: MaterialId::default(),
            color: None,
        };
        let record = record_with_normal(vec3(0.0, 0.0, 1.0), true);
        let (_, color) = diffuse.scatter(&record, vec3(0.0, 0.0, -1.0));
        assert!(color == Color::MAGENTA || color == Color::new(0.1, 0.0, 0.1));
    }
}
