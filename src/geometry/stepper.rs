use crate::math::{Phase, Scalar};

// ─── Adaptive Cash–Karp 4(5) Stepper ────────────────────────────────────────

/// One accepted adaptive step: the new phase and the step size actually
/// taken.
pub(crate) struct Step<const N: usize> {
    pub phase: Phase<N>,
    pub delta_t: Scalar,
}

/// Embedded Runge–Kutta pair of orders 4 and 5 with Cash–Karp coefficients,
/// driving the geodesic phase-space ODE. The error estimate is the infinity
/// norm of the difference between the two solutions, normalised per
/// component by `error_abs + error_rel · |Φ|`; step-size control follows
/// the standard safety-factor power law with clamped shrink/growth.
pub(crate) struct CashKarp45 {
    error_abs: Scalar,
    error_rel: Scalar,
    /// Proposed size for the next step; adapted after every attempt.
    h: Scalar,
}

const SAFETY: Scalar = 0.9;
const MIN_SHRINK: Scalar = 0.2;
const MAX_GROWTH: Scalar = 5.0;
/// Below this step size the integration has effectively stalled.
const MIN_STEP: Scalar = 1e-14;
/// Bound on rejected retries per step; exceeded only for pathological ODEs.
const MAX_REJECTIONS: usize = 64;

impl CashKarp45 {
    pub fn new(initial_step: Scalar, error_abs: Scalar, error_rel: Scalar) -> Self {
        Self {
            error_abs,
            error_rel,
            h: initial_step,
        }
    }

    /// Attempts one adaptive step of `f` starting from `phase`, never
    /// stepping further than `h_max` (the remaining integration budget).
    /// Returns `None` when the error cannot be brought below tolerance at
    /// the minimum step size — the caller ends the ray.
    pub fn step<const N: usize>(
        &mut self,
        f: impl Fn(&Phase<N>) -> Phase<N>,
        phase: &Phase<N>,
        h_max: Scalar,
    ) -> Option<Step<N>> {
        for _ in 0..MAX_REJECTIONS {
            let h = Scalar::min(self.h, h_max);
            if !(h > MIN_STEP) {
                return None;
            }

            let (order5, order4) = cash_karp_pair(&f, phase, h);
            if !order5.is_finite() {
                return None;
            }

            let error = self.normalised_error(phase, &order5, &(order5 - order4));
            if error <= 1.0 {
                // accept, and adapt the next proposal
                let growth = if error > 0.0 {
                    Scalar::min(SAFETY * error.powf(-0.2), MAX_GROWTH)
                } else {
                    MAX_GROWTH
                };
                self.h = h * growth;
                return Some(Step {
                    phase: order5,
                    delta_t: h,
                });
            }

            // reject and shrink
            self.h = h * Scalar::max(SAFETY * error.powf(-0.25), MIN_SHRINK);
        }
        None
    }

    /// Largest per-component ratio of the error estimate to its tolerance.
    fn normalised_error<const N: usize>(
        &self,
        phase: &Phase<N>,
        next: &Phase<N>,
        difference: &Phase<N>,
    ) -> Scalar {
        let tolerance = phase.zip_with(*next, |a, b| {
            self.error_abs + self.error_rel * Scalar::max(a.abs(), b.abs())
        });
        difference.max_ratio(&tolerance)
    }
}

/// Evaluates both embedded solutions of the Cash–Karp tableau.
fn cash_karp_pair<const N: usize>(
    f: &impl Fn(&Phase<N>) -> Phase<N>,
    y: &Phase<N>,
    h: Scalar,
) -> (Phase<N>, Phase<N>) {
    let k1 = f(y);
    let k2 = f(&(*y + k1 * (h * 1.0 / 5.0)));
    let k3 = f(&(*y + k1 * (h * 3.0 / 40.0) + k2 * (h * 9.0 / 40.0)));
    let k4 = f(&(*y + k1 * (h * 3.0 / 10.0) + k2 * (h * -9.0 / 10.0) + k3 * (h * 6.0 / 5.0)));
    let k5 = f(&(*y
        + k1 * (h * -11.0 / 54.0)
        + k2 * (h * 5.0 / 2.0)
        + k3 * (h * -70.0 / 27.0)
        + k4 * (h * 35.0 / 27.0)));
    let k6 = f(&(*y
        + k1 * (h * 1631.0 / 55296.0)
        + k2 * (h * 175.0 / 512.0)
        + k3 * (h * 575.0 / 13824.0)
        + k4 * (h * 44275.0 / 110592.0)
        + k5 * (h * 253.0 / 4096.0)));

    let order5 = *y
        + k1 * (h * 37.0 / 378.0)
        + k3 * (h * 250.0 / 621.0)
        + k4 * (h * 125.0 / 594.0)
        + k6 * (h * 512.0 / 1771.0);
    let order4 = *y
        + k1 * (h * 2825.0 / 27648.0)
        + k3 * (h * 18575.0 / 48384.0)
        + k4 * (h * 13525.0 / 55296.0)
        + k5 * (h * 277.0 / 14336.0)
        + k6 * (h * 1.0 / 4.0);

    (order5, order4)
}
