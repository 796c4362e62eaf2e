use crate::math::Scalar;
use crate::random::random_scalar;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

// ─── Color ──────────────────────────────────────────────────────────────────

/// Linear RGB radiance value. Channels are unbounded floats during
/// accumulation; quantisation to `[0, 255]` happens only at image export.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: Scalar,
    pub g: Scalar,
    pub b: Scalar,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0);
    /// Sentinel for surfaces without a material — loud on purpose.
    pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0);

    #[inline(always)]
    pub const fn new(r: Scalar, g: Scalar, b: Scalar) -> Self {
        Self { r, g, b }
    }

    pub fn random(min: Scalar, max: Scalar) -> Self {
        Self::new(
            random_scalar(min, max),
            random_scalar(min, max),
            random_scalar(min, max),
        )
    }

    #[inline(always)]
    pub fn map(self, f: impl Fn(Scalar) -> Scalar) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

/// Quantises one channel to an 8-bit value. The conversion saturates at both
/// ends and maps NaN to zero so that a single numerically broken sample can
/// never corrupt an exported image.
#[inline]
pub fn u8_from_color_scalar(c: Scalar) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 255.0) as u8
}

impl Color {
    /// Converts to an 8-bit RGB triple, saturating each channel.
    #[inline]
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (
            u8_from_color_scalar(self.r),
            u8_from_color_scalar(self.g),
            u8_from_color_scalar(self.b),
        )
    }
}

impl Neg for Color {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.r, -self.g, -self.b)
    }
}

impl Add for Color {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Sub for Color {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl SubAssign for Color {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        self.r -= rhs.r;
        self.g -= rhs.g;
        self.b -= rhs.b;
    }
}

impl Mul<Scalar> for Color {
    type Output = Self;

    #[inline(always)]
    fn mul(self, t: Scalar) -> Self {
        Self::new(self.r * t, self.g * t, self.b * t)
    }
}

impl Mul<Color> for Scalar {
    type Output = Color;

    #[inline(always)]
    fn mul(self, c: Color) -> Color {
        c * self
    }
}

/// Component-wise (Hadamard) product — each channel is attenuated
/// independently by the surface albedo.
impl Mul for Color {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl MulAssign<Scalar> for Color {
    #[inline(always)]
    fn mul_assign(&mut self, t: Scalar) {
        self.r *= t;
        self.g *= t;
        self.b *= t;
    }
}

impl MulAssign for Color {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        self.r *= rhs.r;
        self.g *= rhs.g;
        self.b *= rhs.b;
    }
}

impl Div<Scalar> for Color {
    type Output = Self;

    #[inline(always)]
    fn div(self, t: Scalar) -> Self {
        let inv = 1.0 / t;
        Self::new(self.r * inv, self.g * inv, self.b * inv)
    }
}

impl DivAssign<Scalar> for Color {
    #[inline(always)]
    fn div_assign(&mut self, t: Scalar) {
        let inv = 1.0 / t;
        self.r *= inv;
        self.g *= inv;
        self.b *= inv;
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({:.3}, {:.3}, {:.3})", self.r, self.g, self.b)
    }
}
