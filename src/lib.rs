//! # photon-geodesic 🔬
//!
//! A physically-based Monte Carlo path tracer for curved space. Instead of
//! following straight lines, light propagates along geodesics of a
//! user-supplied Riemannian (or pseudo-Riemannian) geometry, integrated with
//! an adaptive Runge–Kutta scheme and approximated by straight segments for
//! intersection testing.
//!
//! ## Architecture
//!
//! - **Tensor algebra**: fixed-size vectors, matrices and rank-3 tensors,
//!   generic in the manifold dimension `N` (typically 3 or 4)
//! - **Geometries**: flat Euclidean (3D and embedded nD), Minkowski
//!   spacetime, a swirl geometry, a twisted-orb geometry, and the
//!   Schwarzschild black-hole spacetime
//! - **Scene**: spheres, planes, triangle meshes, instances and constant
//!   density mist, accelerated by a bounding volume hierarchy that is
//!   rebuilt whenever the scene is frozen for a point in time
//! - **Materials**: Lambertian, metal, dielectric (glass), emitter and
//!   isotropic scattering, all evaluated in a local orthonormal frame so
//!   that shading code never sees the curvature
//! - **Renderer**: global or rolling shutter with motion blur, per-pixel
//!   path tracing with a ray-depth budget, rows evaluated in parallel
//!
//! ## Rendering equation
//!
//! The path tracer solves the rendering equation via Monte Carlo integration:
//!
//! ```text
//!   L_o(p, ω_o) = L_e(p, ω_o) + ∫_Ω f_r(p, ω_i, ω_o) · L_i(p, ω_i) · |cos θ_i| dω_i
//! ```
//!
//! The twist is that `L_i` is evaluated along a geodesic: each material's
//! `scatter` method works on 3D orthonormal-basis vectors, and the integrator
//! maps them back onto the manifold via the local Jacobians before the next
//! bounce is traced.

pub mod color;
pub mod error;
pub mod geometry;
pub mod ident;
pub mod image;
pub mod material;
pub mod math;
pub mod random;
pub mod renderer;
pub mod texture;
pub mod world;

pub use color::Color;
pub use error::{RenderError, RenderResult};
pub use image::RawImage;
pub use math::{Scalar, INFINITY, PI};
pub use renderer::{Canvas, Renderer, Shutter};
pub use world::Scene;
