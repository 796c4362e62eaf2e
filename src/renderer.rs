//! The render loop: shutter timing, scene freezing, parallel per-pixel path
//! tracing and sample accumulation.

use crate::color::Color;
use crate::error::{RenderError, RenderResult};
use crate::geometry::{Geometry, ManifoldRay};
use crate::image::RawImage;
use crate::math::{Scalar, INFINITY};
use crate::random::random_scalar;
use crate::world::{FreezeGuard, Scene};
use rayon::prelude::*;

// ─── Render Configuration ───────────────────────────────────────────────────

/// Output dimensions in pixels.
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
        }
    }
}

/// Exposure policy: which point in time each pixel sees.
#[derive(Debug, Clone, Copy)]
pub enum Shutter {
    /// The whole frame is exposed at once: per sample, one time is drawn
    /// from the exposure window and the scene is frozen once for all
    /// pixels. `exposure_time == 0` disables motion blur (and lets the
    /// renderer reuse one freeze for every sample).
    Global { exposure_time: Scalar },
    /// The frame is exposed line by line, like a CMOS sensor: row `j` of
    /// `H` sees a time in
    /// `[time + (j/H)·frame_exposure_time, … + total_line_exposure_time/H]`,
    /// and the scene is re-frozen per row.
    Rolling {
        frame_exposure_time: Scalar,
        total_line_exposure_time: Scalar,
    },
}

/// Progress snapshot passed to the render callbacks after each full sample.
pub struct RenderState<'a> {
    pub image: &'a RawImage,
    pub samples: usize,
}

pub type RenderCallback = Box<dyn Fn(&RenderState<'_>) + Send + Sync>;

/// Path-tracing renderer, generic in the manifold dimension. All fields are
/// plain configuration; `render` borrows the scene mutably for freezing and
/// produces the accumulated image.
pub struct Renderer<const N: usize> {
    pub canvas: Canvas,
    /// Samples per pixel — the higher the better. Typical values: 1–10 for
    /// previews, 10–1000 for mid quality, beyond that for final frames.
    /// Heavily scene-dependent.
    pub samples: usize,
    /// Maximum number of material interactions per ray. Segment advances of
    /// curved rays do *not* count against this budget.
    pub ray_depth: usize,
    /// Start of the frame's exposure.
    pub time: Scalar,
    pub shutter: Shutter,
    /// Lower hit-parameter cutoff, the bias against self-intersection.
    pub minimal_ray_length: Scalar,
    /// Upper cutoff against runaway rays.
    pub maximal_ray_length: Scalar,
    /// Render surface normals instead of materials — a debugging aid.
    pub debug_normals: bool,
    /// Substituted when a ray ends prematurely (integration aborted, depth
    /// exhausted). Black for production, loud green for hunting terminated
    /// rays.
    pub ray_color_if_ray_ended: Color,
    /// Called after every full sample.
    pub frequent_render_callback: Option<RenderCallback>,
    /// Called every `infrequent_callback_frequency` samples — intended for
    /// checkpoint saves.
    pub infrequent_render_callback: Option<RenderCallback>,
    pub infrequent_callback_frequency: usize,
}

/// Color indicator for surfaces without a material.
const RAY_COLOR_NO_MATERIAL: Color = Color::MAGENTA;

/// Forward nudge applied to scattered ray origins, on top of the
/// `minimal_ray_length` bias.
const RAY_SURFACE_OFFSET: Scalar = 1e-6;

impl<const N: usize> Default for Renderer<N> {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            samples: 1,
            ray_depth: 1,
            time: 0.0,
            shutter: Shutter::Global { exposure_time: 0.0 },
            minimal_ray_length: 1e-5,
            maximal_ray_length: INFINITY,
            debug_normals: false,
            ray_color_if_ray_ended: Color::BLACK,
            frequent_render_callback: None,
            infrequent_render_callback: None,
            infrequent_callback_frequency: 10,
        }
    }
}

impl<const N: usize> Renderer<N> {
    /// Renders the scene as seen through its active camera. The scene is
    /// frozen (and thereby locked) once per sample or once per row,
    /// depending on the shutter.
    pub fn render(
        &self,
        geometry: &dyn Geometry<N>,
        scene: &mut Scene<N>,
    ) -> RenderResult<RawImage> {
        self.validate()?;

        let Canvas { width, height } = self.canvas;
        log::info!(
            "rendering {}x{} at {} samples, ray depth {}",
            width,
            height,
            self.samples,
            self.ray_depth
        );

        let mut image = RawImage::new(width, height);
        match self.shutter {
            Shutter::Global { exposure_time } => {
                if exposure_time == 0.0 {
                    // ideal image: no motion blur, one freeze serves every
                    // sample
                    let frozen = scene.freeze_for_time(self.time);
                    for sample in 1..=self.samples {
                        self.render_global_sample(geometry, &frozen, &mut image);
                        self.invoke_callbacks(&image, sample);
                    }
                } else {
                    for sample in 1..=self.samples {
                        let time = random_scalar(self.time, self.time + exposure_time);
                        let frozen = scene.freeze_for_time(time);
                        self.render_global_sample(geometry, &frozen, &mut image);
                        drop(frozen);
                        self.invoke_callbacks(&image, sample);
                    }
                }
            }
            Shutter::Rolling {
                frame_exposure_time,
                total_line_exposure_time,
            } => {
                for sample in 1..=self.samples {
                    for y in 0..height {
                        let line_start =
                            self.time + frame_exposure_time * (y as Scalar / height as Scalar);
                        let time = line_start
                            + random_scalar(0.0, total_line_exposure_time / height as Scalar);
                        let frozen = scene.freeze_for_time(time);
                        let row = &mut image.pixels_mut()[y * width..(y + 1) * width];
                        row.par_iter_mut().enumerate().for_each(|(x, pixel)| {
                            *pixel += self.render_pixel_sample(geometry, &frozen, x, y);
                        });
                    }
                    self.invoke_callbacks(&image, sample);
                }
            }
        }

        image *= 1.0 / self.samples as Scalar;
        Ok(image)
    }

    fn validate(&self) -> RenderResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidCanvas { width, height });
        }
        if self.samples == 0 {
            return Err(RenderError::NoSamples);
        }
        if !(self.minimal_ray_length > 0.0 && self.minimal_ray_length < self.maximal_ray_length) {
            return Err(RenderError::InvalidRayLengthWindow {
                minimal: self.minimal_ray_length,
                maximal: self.maximal_ray_length,
            });
        }
        let exposure_times = match self.shutter {
            Shutter::Global { exposure_time } => [exposure_time, 0.0],
            Shutter::Rolling {
                frame_exposure_time,
                total_line_exposure_time,
            } => [frame_exposure_time, total_line_exposure_time],
        };
        for exposure_time in exposure_times {
            if !(exposure_time.is_finite() && exposure_time >= 0.0) {
                return Err(RenderError::InvalidExposureTime(exposure_time));
            }
        }
        Ok(())
    }

    /// One full-frame sample with a shared frozen scene, rows in parallel.
    fn render_global_sample(
        &self,
        geometry: &dyn Geometry<N>,
        frozen: &FreezeGuard<'_, N>,
        image: &mut RawImage,
    ) {
        let width = self.canvas.width;
        image
            .pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel += self.render_pixel_sample(geometry, frozen, x, y);
                }
            });
    }

    /// One sample of one pixel: jitter inside the pixel, map to canvas
    /// coordinates and trace.
    fn render_pixel_sample(
        &self,
        geometry: &dyn Geometry<N>,
        frozen: &FreezeGuard<'_, N>,
        x: usize,
        y: usize,
    ) -> Color {
        let Canvas { width, height } = self.canvas;
        // random sub-pixel offset for antialiasing
        let x = x as Scalar + random_scalar(-0.5, 0.5);
        let y = y as Scalar + random_scalar(-0.5, 0.5);
        // transform to camera coordinates
        let x = 2.0 * x / width as Scalar - 1.0;
        let y = 2.0 * y / height as Scalar - 1.0;

        let mut ray = frozen.active_camera().ray_for_coords(geometry, x, y);
        self.ray_color(geometry, frozen, ray.as_mut(), self.ray_depth)
    }

    /// Radiance arriving along a ray. The depth budget counts material
    /// interactions only; advancing to the next segment of a curved ray is
    /// free (it is the same light path, just a further piece of it).
    fn ray_color(
        &self,
        geometry: &dyn Geometry<N>,
        frozen: &FreezeGuard<'_, N>,
        ray: &mut dyn ManifoldRay<N>,
        depth: usize,
    ) -> Color {
        if depth == 0 {
            return self.ray_color_if_ray_ended;
        }

        loop {
            let Some(segment) = ray.next_ray_segment() else {
                // the ray ended prematurely (max length or numerics)
                return self.ray_color_if_ray_ended;
            };

            let mut clipped = segment;
            if clipped.t_max > self.maximal_ray_length {
                clipped.t_max = self.maximal_ray_length;
            }

            let Some(record) = frozen.hit_record(geometry, &clipped, self.minimal_ray_length)
            else {
                if segment.t_max.is_infinite() {
                    // nothing between here and infinity: the ray escaped
                    return match frozen.active_background() {
                        Some(background) => background.value(geometry, &segment),
                        None => self.ray_color_if_ray_ended,
                    };
                }
                continue;
            };

            if self.debug_normals {
                let n = record.onb_normal;
                return Color::new(n[0] + 1.0, n[1] + 1.0, n[2] + 1.0) * 0.5;
            }

            let Some(material) = record.material else {
                return RAY_COLOR_NO_MATERIAL;
            };

            let onb_direction = record.to_onb_jacobian * segment.direction;
            let (onb_scattered, attenuation) = material.scatter(&record, onb_direction);
            if onb_scattered.near_zero(1e-12) {
                // emissive material: the path terminates here
                return attenuation;
            }

            // back onto the manifold: convert, re-normalize with the local
            // metric and nudge the origin off the surface
            let direction = record.from_onb_jacobian * onb_scattered;
            let direction = geometry.normalize(record.point, direction);
            let start = record.point + direction * RAY_SURFACE_OFFSET;
            let mut scattered = geometry.ray_from(start, direction);
            return attenuation * self.ray_color(geometry, frozen, scattered.as_mut(), depth - 1);
        }
    }

    fn invoke_callbacks(&self, image: &RawImage, sample: usize) {
        let state = RenderState {
            image,
            samples: sample,
        };
        if let Some(callback) = &self.frequent_render_callback {
            callback(&state);
        }
        if self.infrequent_callback_frequency > 0
            && sample % self.infrequent_callback_frequency == 0
        {
            if let Some(callback) = &self.infrequent_render_callback {
                callback(&state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Euclidean3;
    use crate::material::Emitter;
    use crate::math::vec3;
    use crate::texture::ConstantColor;
    use crate::world::{Camera, ConstantBackground, PinholeCamera, Scene, Sphere};
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn camera_at_z5() -> Box<dyn Camera<3>> {
        Box::new(PinholeCamera::cartesian(
            vec3(0.0, 0.0, 5.0),
            vec3(0.0, 0.0, 4.0),
            vec3(0.0, 1.0, 0.0),
            90.0,
            1.0,
        ))
    }

    fn emissive_sphere_scene() -> Scene<3> {
        // the sphere is large enough that the whole jitter square of the
        // central pixel of a 2x2 canvas lands on it
        let mut scene = Scene::new(camera_at_z5());
        scene.active_background = Some(Box::new(ConstantBackground::new(Color::BLACK)));
        let emitter = Arc::new(Emitter::new(Arc::new(ConstantColor::new(Color::WHITE))));
        scene.add(Box::new(
            Sphere::new(vec3(0.0, 0.0, 0.0), 3.0).with_material(emitter),
        ));
        scene
    }

    #[test]
    fn central_pixel_sees_the_emitter() {
        let mut scene = emissive_sphere_scene();
        let renderer = Renderer::<3> {
            canvas: Canvas {
                width: 2,
                height: 2,
            },
            samples: 4,
            ray_depth: 4,
            ..Renderer::default()
        };
        let image = renderer.render(&Euclidean3, &mut scene).unwrap();
        assert_relative_eq!(image[(1, 1)].r, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_scenes_show_the_background() {
        let mut scene = Scene::new(camera_at_z5());
        scene.active_background = Some(Box::new(ConstantBackground::new(Color::new(
            0.25, 0.5, 0.75,
        ))));
        let renderer = Renderer::<3> {
            canvas: Canvas {
                width: 2,
                height: 2,
            },
            samples: 3,
            ray_depth: 4,
            ..Renderer::default()
        };
        let image = renderer.render(&Euclidean3, &mut scene).unwrap();
        for pixel in image.pixels() {
            assert_relative_eq!(pixel.g, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_depth_returns_the_termination_color() {
        let mut scene = emissive_sphere_scene();
        let renderer = Renderer::<3> {
            canvas: Canvas {
                width: 2,
                height: 2,
            },
            samples: 1,
            ray_depth: 0,
            ray_color_if_ray_ended: Color::GREEN,
            ..Renderer::default()
        };
        let image = renderer.render(&Euclidean3, &mut scene).unwrap();
        assert_eq!(image[(0, 0)], Color::GREEN);
    }

    #[test]
    fn missing_material_renders_magenta() {
        let mut scene = Scene::new(camera_at_z5());
        scene.add(Box::new(Sphere::new(vec3(0.0, 0.0, 0.0), 3.0)));
        let renderer = Renderer::<3> {
            canvas: Canvas {
                width: 2,
                height: 2,
            },
            samples: 1,
            ray_depth: 2,
            ..Renderer::default()
        };
        let image = renderer.render(&Euclidean3, &mut scene).unwrap();
        assert_eq!(image[(1, 1)], Color::MAGENTA);
    }

    #[test]
    fn callbacks_fire_per_sample() {
        let mut scene = emissive_sphere_scene();
        let frequent = Arc::new(AtomicUsize::new(0));
        let infrequent = Arc::new(AtomicUsize::new(0));
        let frequent_clone = Arc::clone(&frequent);
        let infrequent_clone = Arc::clone(&infrequent);
        let renderer = Renderer::<3> {
            canvas: Canvas {
                width: 2,
                height: 2,
            },
            samples: 10,
            ray_depth: 2,
            frequent_render_callback: Some(Box::new(move |_| {
                frequent_clone.fetch_add(1, Ordering::Relaxed);
            })),
            infrequent_render_callback: Some(Box::new(move |_| {
                infrequent_clone.fetch_add(1, Ordering::Relaxed);
            })),
            infrequent_callback_frequency: 5,
            ..Renderer::default()
        };
        renderer.render(&Euclidean3, &mut scene).unwrap();
        assert_eq!(frequent.load(Ordering::Relaxed), 10);
        assert_eq!(infrequent.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let make = Renderer::<3>::default;

        let mut renderer = make();
        renderer.canvas.width = 0;
        assert!(renderer.validate().is_err());

        let mut renderer = make();
        renderer.samples = 0;
        assert!(renderer.validate().is_err());

        let mut renderer = make();
        renderer.minimal_ray_length = 0.0;
        assert!(renderer.validate().is_err());

        let mut renderer = make();
        renderer.shutter = Shutter::Global {
            exposure_time: -1.0,
        };
        assert!(renderer.validate().is_err());

        assert!(make().validate().is_ok());
    }

    #[test]
    fn debug_normals_shows_the_facing_hemisphere() {
        let mut scene = emissive_sphere_scene();
        let renderer = Renderer::<3> {
            canvas: Canvas {
                width: 2,
                height: 2,
            },
            samples: 8,
            ray_depth: 1,
            debug_normals: true,
            ..Renderer::default()
        };
        let image = renderer.render(&Euclidean3, &mut scene).unwrap();
        // center normal points back at the camera (+z): blue channel near 1
        assert!(image[(1, 1)].b > 0.9);
    }
}
