//! Image accumulation and file export.
//!
//! [`RawImage`] holds unbounded linear radiance sums; samples accumulate
//! with `+=` and the final division by the sample count happens in the
//! renderer. Export quantises to PPM (8-bit ASCII) or dumps raw 32-bit
//! floats as PFM.

use crate::color::{u8_from_color_scalar, Color};
use crate::math::Scalar;
use std::io::{self, BufRead, Write};
use std::ops::{AddAssign, Index, IndexMut, MulAssign};

// ─── Raw Image ──────────────────────────────────────────────────────────────

/// A width × height grid of linear RGB values, row-major, `(0, 0)` in the
/// top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pixels: Vec<Color>,
    width: usize,
    height: usize,
}

impl RawImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK; width * height],
            width,
            height,
        }
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat pixel storage, row-major top-to-bottom — the renderer chunks
    /// this into rows for parallel accumulation.
    #[inline(always)]
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    #[inline(always)]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Adds uniform noise to every pixel — handy for debugging sample
    /// accumulation and checkpoint restarts.
    pub fn randomize(&mut self, min: Scalar, max: Scalar) {
        for pixel in &mut self.pixels {
            *pixel += Color::random(min, max);
        }
    }
}

impl Index<(usize, usize)> for RawImage {
    type Output = Color;

    #[inline(always)]
    fn index(&self, (x, y): (usize, usize)) -> &Color {
        &self.pixels[y * self.width + x]
    }
}

impl IndexMut<(usize, usize)> for RawImage {
    #[inline(always)]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Color {
        &mut self.pixels[y * self.width + x]
    }
}

/// Pixel-wise accumulation of another image of the same dimensions.
impl AddAssign<&RawImage> for RawImage {
    fn add_assign(&mut self, other: &RawImage) {
        assert_eq!(self.width, other.width);
        assert_eq!(self.height, other.height);
        for (pixel, other_pixel) in self.pixels.iter_mut().zip(&other.pixels) {
            *pixel += *other_pixel;
        }
    }
}

impl MulAssign<Scalar> for RawImage {
    fn mul_assign(&mut self, factor: Scalar) {
        for pixel in &mut self.pixels {
            *pixel *= factor;
        }
    }
}

// ─── PPM (P3) ───────────────────────────────────────────────────────────────

/// Writes the image as ASCII PPM. Each channel is scaled (e.g. by
/// `1/samples` for an unfinished accumulation), gamma-corrected with
/// `c^(1/γ)` and quantised with saturation; rows are written top to bottom.
pub fn write_image_ppm<W: Write>(
    out: &mut W,
    image: &RawImage,
    scale: Scalar,
    gamma: Scalar,
) -> io::Result<()> {
    let inv_gamma = 1.0 / gamma;
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", image.width(), image.height())?;
    writeln!(out, "255")?;

    for y in 0..image.height() {
        for x in 0..image.width() {
            let color = image[(x, y)];
            let r = u8_from_color_scalar((color.r * scale).powf(inv_gamma));
            let g = u8_from_color_scalar((color.g * scale).powf(inv_gamma));
            let b = u8_from_color_scalar((color.b * scale).powf(inv_gamma));
            write!(out, "{r} {g} {b}   ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

// ─── PFM (PF) ───────────────────────────────────────────────────────────────

/// Writes the image as binary PFM: `PF`, dimensions, a negative scale
/// marking little-endian, then raw 32-bit float RGB triples. Rows are
/// written **top to bottom** — the PFM convention is bottom-up, but writer
/// and reader here agree with the renderer's row order, which keeps
/// checkpoint round-trips trivial.
pub fn write_image_pfm<W: Write>(out: &mut W, image: &RawImage, scale: Scalar) -> io::Result<()> {
    writeln!(out, "PF")?;
    writeln!(out, "{} {}", image.width(), image.height())?;
    writeln!(out, "-{}", scale.abs())?;

    for y in 0..image.height() {
        for x in 0..image.width() {
            let color = image[(x, y)];
            for channel in [color.r, color.g, color.b] {
                out.write_all(&(channel as f32).to_le_bytes())?;
            }
        }
    }
    Ok(())
}

fn parse_error(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Reads a PFM file written by [`write_image_pfm`] (little-endian,
/// top-to-bottom rows). The scale factor is returned alongside the image.
pub fn read_image_pfm<R: BufRead>(input: &mut R) -> io::Result<(RawImage, Scalar)> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    if line.trim() != "PF" {
        return Err(parse_error("not a PFM file (missing PF magic)"));
    }

    line.clear();
    input.read_line(&mut line)?;
    let mut dimensions = line.split_whitespace();
    let width: usize = dimensions
        .next()
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| parse_error("invalid PFM width"))?;
    let height: usize = dimensions
        .next()
        .and_then(|h| h.parse().ok())
        .ok_or_else(|| parse_error("invalid PFM height"))?;

    line.clear();
    input.read_line(&mut line)?;
    let scale: Scalar = line
        .trim()
        .parse()
        .map_err(|_| parse_error("invalid PFM scale"))?;
    if scale >= 0.0 {
        return Err(parse_error("big-endian PFM is not supported"));
    }

    let mut image = RawImage::new(width, height);
    let mut buffer = [0u8; 4];
    for y in 0..height {
        for x in 0..width {
            let mut channels = [0.0; 3];
            for channel in &mut channels {
                input.read_exact(&mut buffer)?;
                *channel = f32::from_le_bytes(buffer) as Scalar;
            }
            image[(x, y)] = Color::new(channels[0], channels[1], channels[2]);
        }
    }
    Ok((image, -scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn gradient_image() -> RawImage {
        let mut image = RawImage::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                image[(x, y)] = Color::new(
                    x as Scalar / 4.0,
                    y as Scalar / 3.0,
                    0.5,
                );
            }
        }
        image
    }

    #[test]
    fn accumulation_is_pixelwise() {
        let mut a = gradient_image();
        let b = gradient_image();
        a += &b;
        a *= 0.5;
        assert_eq!(a, gradient_image());
    }

    #[test]
    fn ppm_has_the_documented_header() {
        let image = gradient_image();
        let mut buffer = Vec::new();
        write_image_ppm(&mut buffer, &image, 1.0, 1.0).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("P3\n4 3\n255\n"));
        // header tokens plus all triples
        let numbers: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(numbers.len(), 4 + 4 * 3 * 3);
    }

    #[test]
    fn ppm_applies_gamma_and_saturates() {
        let mut image = RawImage::new(1, 1);
        image[(0, 0)] = Color::new(0.25, 9.0, -1.0);
        let mut buffer = Vec::new();
        write_image_ppm(&mut buffer, &image, 1.0, 2.0).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let values: Vec<&str> = text.lines().nth(3).unwrap().split_whitespace().collect();
        // 0.25^(1/2) = 0.5 -> 127; overflow saturates; negatives clamp
        assert_eq!(values, ["127", "255", "0"]);
    }

    #[test]
    fn pfm_round_trips() {
        let image = gradient_image();
        let mut buffer = Vec::new();
        write_image_pfm(&mut buffer, &image, 1.0).unwrap();
        let (restored, scale) = read_image_pfm(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(scale, 1.0);
        assert_eq!(restored.width(), image.width());
        assert_eq!(restored.height(), image.height());
        for y in 0..image.height() {
            for x in 0..image.width() {
                assert_relative_eq!(restored[(x, y)].r, image[(x, y)].r, epsilon = 1e-6);
                assert_relative_eq!(restored[(x, y)].g, image[(x, y)].g, epsilon = 1e-6);
                assert_relative_eq!(restored[(x, y)].b, image[(x, y)].b, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn pfm_reader_rejects_foreign_headers() {
        let mut cursor = Cursor::new(b"P6\n1 1\n255\n".to_vec());
        assert!(read_image_pfm(&mut cursor).is_err());
    }

    #[test]
    fn randomize_perturbs_pixels() {
        let mut image = RawImage::new(8, 8);
        image.randomize(0.25, 0.75);
        assert!(image.pixels().iter().all(|p| p.r >= 0.25 && p.r < 0.75));
    }
}
