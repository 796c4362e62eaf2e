use super::vector::{Vec3, VecN};
use super::Scalar;
use std::ops::{Add, Index, Mul, Neg, Sub};

// ─── Fixed-Size Matrix ──────────────────────────────────────────────────────

/// An `R×C` matrix over [`Scalar`], stored row-major. Rectangular shapes are
/// needed for the Jacobians between the manifold tangent space (`N`
/// components) and the local 3D orthonormal frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat<const R: usize, const C: usize>(pub(crate) [[Scalar; C]; R]);

/// Square 3×3 matrix, the shape of all rotation and ONB matrices.
pub type Mat3 = Mat<3, 3>;

impl<const R: usize, const C: usize> Mat<R, C> {
    #[inline(always)]
    pub const fn from_rows(rows: [[Scalar; C]; R]) -> Self {
        Self(rows)
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self([[0.0; C]; R])
    }

    #[inline(always)]
    pub fn row(&self, i: usize) -> VecN<C> {
        VecN(self.0[i])
    }

    #[inline]
    pub fn column(&self, j: usize) -> VecN<R> {
        let mut data = [0.0; R];
        for i in 0..R {
            data[i] = self.0[i][j];
        }
        VecN(data)
    }

    #[inline]
    pub fn transpose(&self) -> Mat<C, R> {
        let mut data = [[0.0; R]; C];
        for i in 0..R {
            for j in 0..C {
                data[j][i] = self.0[i][j];
            }
        }
        Mat(data)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().flatten().all(|c| c.is_finite())
    }
}

impl<const N: usize> Mat<N, N> {
    #[inline]
    pub fn identity() -> Self {
        let mut data = [[0.0; N]; N];
        for (i, row) in data.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self(data)
    }

    /// Diagonal matrix scaling each axis by the matching coefficient of `v`.
    #[inline]
    pub fn scaling(v: VecN<N>) -> Self {
        let mut data = [[0.0; N]; N];
        for (i, row) in data.iter_mut().enumerate() {
            row[i] = v[i];
        }
        Self(data)
    }

    /// Inverse of [`Mat::scaling`]; no coefficient of `v` may be zero.
    #[inline]
    pub fn inverse_scaling(v: VecN<N>) -> Self {
        let mut data = [[0.0; N]; N];
        for (i, row) in data.iter_mut().enumerate() {
            row[i] = 1.0 / v[i];
        }
        Self(data)
    }
}

impl Mat3 {
    /// Rotation matrix for the given Trait-Bryan angles. Rotations are
    /// performed around each axis separately in the order `R_x`, `R_y`,
    /// `R_z` (roll, pitch, yaw).
    pub fn rotation(angles: Vec3) -> Self {
        let (sx, cx) = angles.x().sin_cos();
        let (sy, cy) = angles.y().sin_cos();
        let (sz, cz) = angles.z().sin_cos();

        Self::from_rows([
            [cy * cz, sx * sy * cz - cx * sz, cx * sy * cz + sx * sz],
            [cy * sz, sx * sy * sz + cx * cz, cx * sy * sz - sx * cz],
            [-sy, sx * cy, cx * cy],
        ])
    }

    /// Inverse of [`Mat3::rotation`]: the same rotations around the inverted
    /// axes in the order `R_(-z)`, `R_(-y)`, `R_(-x)` (yaw, pitch, roll).
    pub fn inverse_rotation(angles: Vec3) -> Self {
        let (sx, cx) = angles.x().sin_cos();
        let (sy, cy) = angles.y().sin_cos();
        let (sz, cz) = angles.z().sin_cos();

        Self::from_rows([
            [cy * cz, cy * sz, -sy],
            [sx * sy * cz - cx * sz, cx * cz + sx * sy * sz, sx * cy],
            [cx * sy * cz + sx * sz, -cz * sx + cx * sy * sz, cx * cy],
        ])
    }
}

/// Embeds an `FR×FC` block into an otherwise zero `TR×TC` matrix with its
/// upper-left corner at `(RO, CO)`. The flat geometries use this to express
/// their 3×N / N×3 identity-block Jacobians.
#[inline]
pub fn embedded_matrix<
    const TR: usize,
    const TC: usize,
    const RO: usize,
    const CO: usize,
    const FR: usize,
    const FC: usize,
>(
    m: Mat<FR, FC>,
) -> Mat<TR, TC> {
    debug_assert!(RO + FR <= TR && CO + FC <= TC);
    let mut data = [[0.0; TC]; TR];
    for i in 0..FR {
        for j in 0..FC {
            data[RO + i][CO + j] = m.0[i][j];
        }
    }
    Mat(data)
}

// ─── Operators ──────────────────────────────────────────────────────────────

impl<const R: usize, const C: usize> Index<usize> for Mat<R, C> {
    type Output = [Scalar; C];

    #[inline(always)]
    fn index(&self, i: usize) -> &[Scalar; C] {
        &self.0[i]
    }
}

impl<const R: usize, const C: usize> Neg for Mat<R, C> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        let mut data = self.0;
        for row in &mut data {
            for c in row {
                *c = -*c;
            }
        }
        Self(data)
    }
}

impl<const R: usize, const C: usize> Add for Mat<R, C> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut data = self.0;
        for i in 0..R {
            for j in 0..C {
                data[i][j] += rhs.0[i][j];
            }
        }
        Self(data)
    }
}

impl<const R: usize, const C: usize> Sub for Mat<R, C> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut data = self.0;
        for i in 0..R {
            for j in 0..C {
                data[i][j] -= rhs.0[i][j];
            }
        }
        Self(data)
    }
}

impl<const R: usize, const C: usize> Mul<Scalar> for Mat<R, C> {
    type Output = Self;

    #[inline]
    fn mul(self, t: Scalar) -> Self {
        let mut data = self.0;
        for row in &mut data {
            for c in row {
                *c *= t;
            }
        }
        Self(data)
    }
}

impl<const R: usize, const C: usize> Mul<Mat<R, C>> for Scalar {
    type Output = Mat<R, C>;

    #[inline]
    fn mul(self, m: Mat<R, C>) -> Mat<R, C> {
        m * self
    }
}

/// Matrix × column vector.
impl<const R: usize, const C: usize> Mul<VecN<C>> for Mat<R, C> {
    type Output = VecN<R>;

    #[inline]
    fn mul(self, v: VecN<C>) -> VecN<R> {
        let mut data = [0.0; R];
        for i in 0..R {
            let mut sum = 0.0;
            for j in 0..C {
                sum += self.0[i][j] * v[j];
            }
            data[i] = sum;
        }
        VecN(data)
    }
}

/// Row vector × matrix.
impl<const R: usize, const C: usize> Mul<Mat<R, C>> for VecN<R> {
    type Output = VecN<C>;

    #[inline]
    fn mul(self, m: Mat<R, C>) -> VecN<C> {
        let mut data = [0.0; C];
        for (j, out) in data.iter_mut().enumerate() {
            let mut sum = 0.0;
            for i in 0..R {
                sum += self[i] * m.0[i][j];
            }
            *out = sum;
        }
        VecN(data)
    }
}

/// Shape-composing matrix product.
impl<const R: usize, const K: usize, const C: usize> Mul<Mat<K, C>> for Mat<R, K> {
    type Output = Mat<R, C>;

    #[inline]
    fn mul(self, rhs: Mat<K, C>) -> Mat<R, C> {
        let mut data = [[0.0; C]; R];
        for i in 0..R {
            for j in 0..C {
                let mut sum = 0.0;
                for k in 0..K {
                    sum += self.0[i][k] * rhs.0[k][j];
                }
                data[i][j] = sum;
            }
        }
        Mat(data)
    }
}
