use crate::color::Color;
use crate::geometry::{Geometry, RaySegment};
use crate::ident::BackgroundId;

// ─── Backgrounds ────────────────────────────────────────────────────────────

/// Radiance of the environment for rays that leave the scene without
/// hitting anything.
pub trait Background<const N: usize>: Send + Sync {
    fn value(&self, geometry: &dyn Geometry<N>, segment: &RaySegment<N>) -> Color;
}

/// Uniform global illumination.
pub struct ConstantBackground {
    pub id: BackgroundId,
    pub color: Color,
}

impl ConstantBackground {
    pub fn new(color: Color) -> Self {
        Self {
            id: BackgroundId::default(),
            color,
        }
    }
}

impl<const N: usize> Background<N> for ConstantBackground {
    fn value(&self, _geometry: &dyn Geometry<N>, _segment: &RaySegment<N>) -> Color {
        self.color
    }
}

/// A simple sky gradient blending between two colors by the vertical
/// component of the (orthonormal-frame) ray direction.
pub struct SimpleSky {
    pub id: BackgroundId,
    pub color1: Color,
    pub color2: Color,
}

impl SimpleSky {
    pub fn new(color1: Color, color2: Color) -> Self {
        Self {
            id: BackgroundId::default(),
            color1,
            color2,
        }
    }
}

impl Default for SimpleSky {
    fn default() -> Self {
        Self::new(Color::WHITE, Color::new(0.5, 0.7, 1.0))
    }
}

impl<const N: usize> Background<N> for SimpleSky {
    fn value(&self, geometry: &dyn Geometry<N>, segment: &RaySegment<N>) -> Color {
        let direction = (geometry.to_onb_jacobian(segment.start) * segment.direction).unit();
        let t = 0.5 * (direction[1].abs() + 1.0);
        self.color1 * (1.0 - t) + self.color2 * t
    }
}
