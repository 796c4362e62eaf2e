use super::stepper::CashKarp45;
use super::{Geometry, ManifoldRay, RaySegment};
use crate::error::{RenderError, RenderResult};
use crate::math::{outer_sum, Phase, Scalar, Ten3, VecN, INFINITY};

// ─── Ray Integration Parameters ─────────────────────────────────────────────

/// Tuning knobs for the adaptive geodesic integration, shared by every
/// curved geometry.
#[derive(Debug, Clone, Copy)]
pub struct RayIntegration {
    /// Step size the stepper starts out with.
    pub initial_step: Scalar,
    /// Absolute error tolerance per phase component.
    pub error_abs: Scalar,
    /// Relative error tolerance per phase component.
    pub error_rel: Scalar,
    /// Upper bound on the accumulated integration parameter of a ray.
    pub max_length: Scalar,
    /// Factor by which each emitted segment is stretched. Should be slightly
    /// above one to avoid small-scale banding at segment seams.
    pub segment_length_factor: Scalar,
}

impl RayIntegration {
    pub fn new(
        initial_step: Scalar,
        error_abs: Scalar,
        error_rel: Scalar,
        max_length: Scalar,
        segment_length_factor: Scalar,
    ) -> RenderResult<Self> {
        for (name, value) in [
            ("initial_step", initial_step),
            ("error_abs", error_abs),
            ("error_rel", error_rel),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RenderError::InvalidIntegrationParameter { name, value });
            }
        }
        if !(max_length > 0.0) {
            return Err(RenderError::InvalidIntegrationParameter {
                name: "max_length",
                value: max_length,
            });
        }
        if !(segment_length_factor >= 1.0) {
            return Err(RenderError::InvalidSegmentLengthFactor(
                segment_length_factor,
            ));
        }
        Ok(Self {
            initial_step,
            error_abs,
            error_rel,
            max_length,
            segment_length_factor,
        })
    }
}

// ─── Curved Geometry ────────────────────────────────────────────────────────

/// A geometry whose rays are produced by numerically integrating the
/// geodesic equation
///
/// ```text
///   dx/dλ = ẋ
///   dẋ/dλ = −Γ²(x)[ẋ, ẋ]
/// ```
///
/// Implementors supply the Christoffel symbols of the second kind and may
/// flag regions where the geometry is effectively flat.
pub trait CurvedGeometry<const N: usize>: Geometry<N> {
    /// Christoffel symbols of the second kind `Γⁱ_{jk}` at `position`.
    fn christoffel_2(&self, position: VecN<N>) -> Ten3<N>;

    /// True iff the ray may be extended straight to infinity from here —
    /// useful when the geometry becomes flat outside a finite region.
    fn treat_as_infinite_segment(&self, _position: VecN<N>, _velocity: VecN<N>) -> bool {
        false
    }

    /// The integration parameters this geometry was configured with.
    fn ray_integration(&self) -> &RayIntegration;
}

// ─── Geodesic Ray ───────────────────────────────────────────────────────────

/// A lazy stream of straight segments approximating a geodesic of a
/// [`CurvedGeometry`]. Segments are produced in monotonically increasing
/// integration parameter; each is the pre-step position and velocity
/// stretched over the accepted step size.
pub struct GeodesicRay<'a, const N: usize> {
    geometry: &'a dyn CurvedGeometry<N>,
    stepper: CashKarp45,
    phase: Phase<N>,
    lambda: Scalar,
    finished: bool,
}

impl<'a, const N: usize> GeodesicRay<'a, N> {
    pub fn new(
        geometry: &'a dyn CurvedGeometry<N>,
        start: VecN<N>,
        direction: VecN<N>,
    ) -> Self {
        let parameters = geometry.ray_integration();
        Self {
            geometry,
            stepper: CashKarp45::new(
                parameters.initial_step,
                parameters.error_abs,
                parameters.error_rel,
            ),
            phase: outer_sum(start, direction),
            lambda: 0.0,
            finished: false,
        }
    }

    /// Current phase-space point `(x, ẋ)` of the integration.
    pub fn phase(&self) -> Phase<N> {
        self.phase
    }
}

/// Right-hand side of the geodesic ODE for one geometry.
fn phase_derivative<const N: usize>(
    geometry: &dyn CurvedGeometry<N>,
    phase: &Phase<N>,
) -> Phase<N> {
    let (position, velocity) = phase.split();
    let curvature = geometry.christoffel_2(position);
    outer_sum(velocity, -curvature.double_contract_lower(velocity))
}

impl<const N: usize> ManifoldRay<N> for GeodesicRay<'_, N> {
    fn next_ray_segment(&mut self) -> Option<RaySegment<N>> {
        if self.finished {
            return None;
        }

        // check for ray length
        if self.lambda > self.geometry.ray_integration().max_length {
            self.finished = true;
            return None;
        }

        let (position, velocity) = self.phase.split();

        if self.geometry.treat_as_infinite_segment(position, velocity) {
            // the rest of the geodesic is a straight line
            self.finished = true;
            return Some(RaySegment::new(position, velocity, INFINITY));
        }

        // check for numerical issues
        let x = position.length();
        let v = velocity.length();
        if !(0.0 < x && x < INFINITY) || !(0.0 < v && v < INFINITY) {
            self.finished = true;
            return None;
        }

        // advance the stepper by one accepted step, staying inside the
        // remaining integration budget
        let geometry = self.geometry;
        let remaining = geometry.ray_integration().max_length - self.lambda;
        let Some(step) = self.stepper.step(
            |phase| phase_derivative(geometry, phase),
            &self.phase,
            remaining,
        ) else {
            self.finished = true;
            return None;
        };

        // note: the emitted segment uses the pre-step position and velocity;
        //       the direction is approximately constant over a small step
        // note: the interval is stretched a tiny bit to avoid small-scale
        //       geometrical banding at segment seams
        let delta_t = step.delta_t * self.geometry.ray_integration().segment_length_factor;
        self.phase = step.phase;
        self.lambda += step.delta_t;

        Some(RaySegment::new(position, velocity, delta_t))
    }
}
