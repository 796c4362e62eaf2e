//! Dimension-generic tensor algebra.
//!
//! Every heavy calculation in the engine funnels through these types so that
//! geometries and entities of different manifold dimensions share one code
//! path. All shapes are compile-time constants; none of the operations
//! perform runtime shape checks.

mod matrix;
mod phase;
mod tensor;
mod vector;

pub use matrix::{embedded_matrix, Mat, Mat3};
pub(crate) use tensor::christoffel_second_kind;
pub use phase::{outer_sum, Phase};
pub use tensor::Ten3;
pub use vector::{embedded_vector, vec2, vec3, vec4, VecN, Vec2, Vec3, Vec4};

/// Floating point type used for all geometric quantities.
pub type Scalar = f64;

/// Positive infinity — the canonical "no hit" / "unbounded" sentinel.
pub const INFINITY: Scalar = Scalar::INFINITY;

/// π
pub const PI: Scalar = std::f64::consts::PI;

/// Converts degrees to radians.
#[inline(always)]
pub fn rad_from_deg(deg: Scalar) -> Scalar {
    deg * (PI / 180.0)
}
