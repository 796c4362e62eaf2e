use crate::math::Scalar;
use thiserror::Error;

/// Configuration errors surfaced by the library. Numerical trouble inside a
/// single ray never reaches this level — rays end quietly and the renderer
/// substitutes a configurable color. Invariant violations (mutating a frozen
/// scene, querying a missing cache) are prevented by the borrow checker or
/// panic.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("ray integration parameter `{name}` must be finite and strictly positive, got {value}")]
    InvalidIntegrationParameter { name: &'static str, value: Scalar },

    #[error("segment length factor must be at least 1, got {0}")]
    InvalidSegmentLengthFactor(Scalar),

    #[error("canvas dimensions must be non-zero, got {width}x{height}")]
    InvalidCanvas { width: usize, height: usize },

    #[error("samples per pixel must be non-zero")]
    NoSamples,

    #[error("minimal ray length {minimal} must be positive and below maximal ray length {maximal}")]
    InvalidRayLengthWindow { minimal: Scalar, maximal: Scalar },

    #[error("exposure time must be finite and non-negative, got {0}")]
    InvalidExposureTime(Scalar),
}

pub type RenderResult<T> = Result<T, RenderError>;
