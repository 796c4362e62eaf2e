//! Demo: rolling-shutter distortion. A sphere sweeps sideways while the
//! frame is exposed line by line, so it comes out sheared — the same effect
//! that bends propeller blades in phone videos.

use clap::Parser;
use crossterm::style::Stylize;
use photon_geodesic::geometry::Euclidean3;
use photon_geodesic::material::Diffuse;
use photon_geodesic::math::{vec3, Scalar};
use photon_geodesic::texture::{ConstantColor, Texture};
use photon_geodesic::world::{PinholeCamera, SimpleSky, Sphere};
use photon_geodesic::{Canvas, Color, Renderer, Scene, Shutter};
use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::sync::Arc;

/// Render the rolling-shutter demo scene.
#[derive(Parser, Debug)]
#[command(
    name = "rolling_shutter",
    version,
    about = "A moving sphere recorded with a rolling shutter"
)]
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

    /// Shutter mode for image exposure
    #[arg(long, value_enum, default_value_t = ShutterMode::Rolling)]
    shutter_mode: ShutterMode,

    /// Total exposure time per frame
    #[arg(long, default_value_t = 0.5)]
    exposure_time: f64,

    /// Exposure time per line (rolling shutter mode only)
    #[arg(long, default_value_t = 0.0)]
    total_line_exposure_time: f64,

    /// Gamma correction for the PPM output
    #[arg(long, default_value_t = 2.0)]
    gamma: f64,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ShutterMode {
    Global,
    Rolling,
}

fn make_scene() -> Scene<3> {
    let camera = PinholeCamera::cartesian(
        vec3(0.0, 0.0, 6.0),
        vec3(0.0, 0.0, 5.0),
        vec3(0.0, 1.0, 0.0),
        70.0,
        16.0 / 9.0,
    );
    let mut scene = Scene::new(Box::new(camera));
    scene.active_background = Some(Box::new(SimpleSky::default()));

    let red: Arc<dyn Texture<3>> = Arc::new(ConstantColor::new(Color::new(0.75, 0.3, 0.3)));
    let mut sphere = Sphere::new(vec3(-1.5, 0.0, 0.0), 1.0)
        .with_material(Arc::new(Diffuse::new(red)));
    // sweeping sideways at three units per frame time
    sphere.animator = Some(Box::new(|time: Scalar, s: &mut Sphere<3>| {
        s.position = vec3(-1.5 + 3.0 * time, 0.0, 0.0);
    }));
    scene.add(Box::new(sphere));

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

    let geometry = Euclidean3;
    let mut scene = make_scene();

    let shutter = match cli.shutter_mode {
        ShutterMode::Global => Shutter::Global {
            exposure_time: cli.exposure_time,
        },
        ShutterMode::Rolling => Shutter::Rolling {
            frame_exposure_time: cli.exposure_time,
            total_line_exposure_time: cli.total_line_exposure_time,
        },
    };

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
        shutter,
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
