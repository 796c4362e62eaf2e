//! Textures: colors as functions of surface and volume coordinates.

use crate::color::Color;
use crate::ident::TextureId;
use crate::math::{Scalar, Vec2, VecN, PI};

// ─── Texture Contract ───────────────────────────────────────────────────────

/// Color of a surface point, addressed by its `(u, v)` surface coordinates
/// and its manifold position.
pub trait Texture<const N: usize>: Send + Sync {
    fn value(&self, uv_coordinates: Vec2, point: VecN<N>) -> Color;
}

/// The loud pink/black UV checker shown wherever no texture is bound.
pub fn missing_texture_value(uv_coordinates: Vec2) -> Color {
    const SCALE: Scalar = 1.0 / 10.0;
    const LIGHT: Color = Color::MAGENTA;
    const DARK: Color = Color::new(0.1, 0.0, 0.1);
    let value = (uv_coordinates.u() / SCALE) as i64 + (uv_coordinates.v() / SCALE) as i64;
    if value % 2 == 0 {
        LIGHT
    } else {
        DARK
    }
}

// ─── Constant Color ─────────────────────────────────────────────────────────

pub struct ConstantColor {
    pub id: TextureId,
    pub color: Color,
}

impl ConstantColor {
    pub fn new(color: Color) -> Self {
        Self {
            id: TextureId::default(),
            color,
        }
    }
}

impl<const N: usize> Texture<N> for ConstantColor {
    fn value(&self, _uv_coordinates: Vec2, _point: VecN<N>) -> Color {
        self.color
    }
}

// ─── Surface Checker ────────────────────────────────────────────────────────

/// Checker pattern over the surface coordinates; `scale` is the edge length
/// of one tile, `offset` shifts the pattern.
pub struct SurfaceChecker {
    pub id: TextureId,
    pub color1: Color,
    pub color2: Color,
    pub offset: Vec2,
    pub scale: Scalar,
}

impl SurfaceChecker {
    pub fn new(color1: Color, color2: Color, scale: Scalar) -> Self {
        Self {
            id: TextureId::default(),
            color1,
            color2,
            offset: Vec2::zero(),
            scale,
        }
    }
}

impl<const N: usize> Texture<N> for SurfaceChecker {
    fn value(&self, uv_coordinates: Vec2, _point: VecN<N>) -> Color {
        let c = (uv_coordinates - self.offset) * (PI / self.scale);
        let value = c.u().sin() * c.v().sin();
        if value < 0.0 {
            self.color1
        } else {
            self.color2
        }
    }
}

// ─── Volume Checker ─────────────────────────────────────────────────────────

/// Checker pattern over the manifold coordinates of the hit point — useful
/// for entities without meaningful surface coordinates (spheres in `N`
/// dimensions report dummy UVs).
pub struct VolumeChecker<const N: usize> {
    pub id: TextureId,
    pub color1: Color,
    pub color2: Color,
    pub offset: VecN<N>,
    pub scale: Scalar,
}

impl<const N: usize> VolumeChecker<N> {
    pub fn new(color1: Color, color2: Color, scale: Scalar) -> Self {
        Self {
            id: TextureId::default(),
            color1,
            color2,
            offset: VecN::zero(),
            scale,
        }
    }
}

impl<const N: usize> Texture<N> for VolumeChecker<N> {
    fn value(&self, _uv_coordinates: Vec2, point: VecN<N>) -> Color {
        let p = (point - self.offset) * (PI / self.scale);
        let value: Scalar = p.map(Scalar::sin).iter().product();
        if value < 0.0 {
            self.color1
        } else {
            self.color2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{vec2, vec3};

    #[test]
    fn constant_color_is_constant() {
        let texture = ConstantColor::new(Color::RED);
        let value = Texture::<3>::value(&texture, vec2(0.3, 0.8), vec3(1.0, 2.0, 3.0));
        assert_eq!(value, Color::RED);
    }

    #[test]
    fn surface_checker_alternates_between_tiles() {
        let texture = SurfaceChecker::new(Color::WHITE, Color::BLACK, 1.0);
        let a = Texture::<3>::value(&texture, vec2(0.5, 0.5), vec3(0.0, 0.0, 0.0));
        let b = Texture::<3>::value(&texture, vec2(1.5, 0.5), vec3(0.0, 0.0, 0.0));
        assert_ne!(a, b);
        // two tiles over is the same color again
        let c = Texture::<3>::value(&texture, vec2(2.5, 0.5), vec3(0.0, 0.0, 0.0));
        assert_eq!(a, c);
    }

    #[test]
    fn volume_checker_alternates_in_space() {
        let texture = VolumeChecker::<3>::new(Color::WHITE, Color::BLACK, 1.0);
        let a = texture.value(vec2(0.0, 0.0), vec3(0.5, 0.5, 0.5));
        let b = texture.value(vec2(0.0, 0.0), vec3(1.5, 0.5, 0.5));
        assert_ne!(a, b);
    }

    #[test]
    fn missing_texture_is_a_checker() {
        let a = missing_texture_value(vec2(0.05, 0.05));
        let b = missing_texture_value(vec2(0.15, 0.05));
        assert_ne!(a, b);
    }
}
