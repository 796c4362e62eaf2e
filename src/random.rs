//! Thread-local random number generation.
//!
//! Rendering threads never share generator state: each thread lazily seeds
//! its own [`SmallRng`] from a process-wide counter, so sampling needs no
//! locking anywhere on the hot path.

use crate::math::{Scalar, Vec3, VecN};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

static THREAD_COUNTER: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static THREAD_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::seed_from_u64(
        42 * THREAD_COUNTER.fetch_add(1, Ordering::Relaxed) + 1,
    ));
}

/// Uniform random scalar in `[min, max)`. Degenerate ranges (`min >= max`)
/// return `min` so that a zero exposure window is a valid configuration.
#[inline]
pub fn random_scalar(min: Scalar, max: Scalar) -> Scalar {
    if min >= max {
        return min;
    }
    THREAD_RNG.with(|rng| rng.borrow_mut().gen_range(min..max))
}

/// Uniformly distributed random point inside the `N`-dimensional unit sphere
/// via rejection sampling on the enclosing cube. Used for Lambertian and
/// isotropic scattering.
pub fn random_vec_inside_unit_sphere<const N: usize>() -> VecN<N> {
    loop {
        let v = VecN::<N>::random(-1.0, 1.0);
        if v.length_squared() < 1.0 {
            return v;
        }
    }
}

/// Uniform random direction: a point on the surface of the unit sphere.
pub fn random_unit_vec<const N: usize>() -> VecN<N> {
    random_vec_inside_unit_sphere::<N>().unit()
}

/// Random point on the unit disk in the x–y plane — used for depth-of-field
/// style detector jitter.
pub fn random_in_unit_disk() -> Vec3 {
    loop {
        let v = VecN([random_scalar(-1.0, 1.0), random_scalar(-1.0, 1.0), 0.0]);
        if v.length_squared() < 1.0 {
            return v;
        }
    }
}
