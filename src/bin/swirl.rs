//! Demo: spheres seen through the swirl geometry — space twists around the
//! z axis with height and distance, and straight edges render as spirals.

use clap::Parser;
use crossterm::style::Stylize;
use photon_geodesic::geometry::{RayIntegration, Swirl};
use photon_geodesic::material::{Diffuse, Emitter, Metal};
use photon_geodesic::math::vec3;
use photon_geodesic::texture::{ConstantColor, Texture, VolumeChecker};
use photon_geodesic::world::{PinholeCamera, SimpleSky, Sphere};
use photon_geodesic::{Canvas, Color, Renderer, Scene, Shutter};
use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::sync::Arc;

/// Render the swirl-geometry demo scene.
#[derive(Parser, Debug)]
#[command(name = "swirl", version, about = "Path tracing in a swirled non-Euclidean geometry")]
struct Cli {
    /// File output path (excluding extensions)
    #[arg(short, long)]
    out: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Resolution factor: 1 = 240p, 8 = 1080p, 16 = 4k
    #[arg(long, default_value_t = 1)]
    resolution_factor: usize,

    /// Samples per pixel
    #[arg(long, default_value_t = 5)]
    samples: usize,

    /// Save progress every n samples
    #[arg(long, default_value_t = 10)]
    save_frequency: usize,

    /// Maximum material interactions per ray
    #[arg(long, default_value_t = 50)]
    ray_depth: usize,

    /// Time of the frame
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Gamma correction for the PPM output
    #[arg(long, default_value_t = 2.0)]
    gamma: f64,

    /// Strength of the swirl (0 = flat Euclidean space)
    #[arg(long, default_value_t = 0.1)]
    swirl_strength: f64,

    /// Initial step size of the ray integration
    #[arg(long, default_value_t = 0.1)]
    ray_initial_step_size: f64,

    /// Absolute error tolerance of the ray integration
    #[arg(long, default_value_t = 1e-6)]
    ray_error_abs: f64,

    /// Relative error tolerance of the ray integration
    #[arg(long, default_value_t = 1e-6)]
    ray_error_rel: f64,

    /// Upper bound on the integrated ray length
    #[arg(long, default_value_t = 100.0)]
    ray_max_length: f64,

    /// Segment stretch factor (slightly above 1 avoids banding)
    #[arg(long, default_value_t = 1.1)]
    ray_segment_length_factor: f64,

    /// Render surface normals instead of materials
    #[arg(long)]
    debug_normals: bool,

    /// Color prematurely terminated rays green
    #[arg(long)]
    debug_ray_terminations: bool,
}

fn make_scene() -> Scene<3> {
    let camera = PinholeCamera::cartesian(
        vec3(0.0, 2.0, 6.0),
        vec3(0.0, 1.5, 5.0),
        vec3(0.0, 1.0, 0.0),
        70.0,
        16.0 / 9.0,
    );
    let mut scene = Scene::new(Box::new(camera));
    scene.active_background = Some(Box::new(SimpleSky::default()));

    let checker: Arc<dyn Texture<3>> = Arc::new(VolumeChecker::new(
        Color::new(0.45, 0.45, 0.45),
        Color::new(0.55, 0.55, 0.55),
        0.5,
    ));
    scene.add(Box::new(
        Sphere::new(vec3(0.0, -10.0, 0.0), 10.0)
            .with_material(Arc::new(Diffuse::new(checker))),
    ));

    let red: Arc<dyn Texture<3>> = Arc::new(ConstantColor::new(Color::new(0.75, 0.5, 0.5)));
    scene.add(Box::new(
        Sphere::new(vec3(-1.0, 1.0, 0.0), 0.5).with_material(Arc::new(Diffuse::new(red))),
    ));

    let mirror: Arc<dyn Texture<3>> = Arc::new(ConstantColor::new(Color::new(0.8, 0.8, 0.9)));
    scene.add(Box::new(
        Sphere::new(vec3(1.0, 1.0, 0.0), 0.5).with_material(Arc::new(Metal::new(mirror, 0.0))),
    ));

    let light: Arc<dyn Texture<3>> = Arc::new(ConstantColor::new(Color::new(1.7, 1.9, 1.5)));
    scene.add(Box::new(
        Sphere::new(vec3(0.0, 3.0, -2.0), 1.0).with_material(Arc::new(Emitter::new(light))),
    ));

    scene
}

fn save_ppm(path_stem: &str, image: &photon_geodesic::RawImage, scale: f64, gamma: f64) {
    let path = format!("{path_stem}.ppm");
    match File::create(&path) {
        Ok(file) => {
            let mut writer = BufWriter::new(file);
            if let Err(error) =
                photon_geodesic::image::write_image_ppm(&mut writer, image, scale, gamma)
            {
                log::error!("failed to write {path}: {error}");
            }
        }
        Err(error) => log::error!("cannot open {path}: {error}"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let integration = match RayIntegration::new(
        cli.ray_initial_step_size,
        cli.ray_error_abs,
        cli.ray_error_rel,
        cli.ray_max_length,
        cli.ray_segment_length_factor,
    ) {
        Ok(integration) => integration,
        Err(error) => {
            log::error!("{error}");
            return ExitCode::FAILURE;
        }
    };
    let geometry = Swirl::new(cli.swirl_strength, integration);
    let mut scene = make_scene();

    let out = cli.out.clone();
    let gamma = cli.gamma;
    let renderer = Renderer::<3> {
        canvas: Canvas {
            width: 240 * cli.resolution_factor,
            height: 135 * cli.resolution_factor,
        },
        samples: cli.samples,
        ray_depth: cli.ray_depth,
        time: cli.time,
        shutter: Shutter::Global { exposure_time: 0.0 },
        maximal_ray_length: cli.ray_max_length,
        debug_normals: cli.debug_normals,
        ray_color_if_ray_ended: if cli.debug_ray_terminations {
            Color::new(0.0, 100.0, 0.0)
        } else {
            Color::BLACK
        },
        frequent_render_callback: Some(Box::new(|state| {
            eprintln!("  {} {}", "sample".dark_grey(), state.samples);
        })),
        infrequent_render_callback: Some(Box::new(move |state| {
            eprintln!("  {}", "saving checkpoint ...".green());
            let scale = 1.0 / state.samples as f64;
            save_ppm(&format!("{out}.current"), state.image, scale, gamma);
        })),
        infrequent_callback_frequency: cli.save_frequency,
        ..Renderer::default()
    };

    match renderer.render(&geometry, &mut scene) {
        Ok(image) => {
            save_ppm(&cli.out, &image, 1.0, cli.gamma);
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("render failed: {error}");
            ExitCode::FAILURE
        }
    }
}
