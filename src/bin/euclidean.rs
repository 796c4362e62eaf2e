//! Demo: a classic path-traced sphere scene in flat Euclidean space — the
//! baseline every curved geometry is compared against.

use clap::Parser;
use crossterm::style::Stylize;
use photon_geodesic::geometry::Euclidean3;
use photon_geodesic::material::{Dielectric, Diffuse, Metal};
use photon_geodesic::math::vec3;
use photon_geodesic::texture::{ConstantColor, SurfaceChecker, Texture, VolumeChecker};
use photon_geodesic::world::{Instance, PinholeCamera, Plane, SimpleSky, Sphere};
use photon_geodesic::{Canvas, Color, Renderer, Scene, Shutter};
use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::sync::Arc;

/// Render the flat-space demo scene.
#[derive(Parser, Debug)]
#[command(name = "euclidean", version, about = "Path-traced spheres in flat Euclidean space")]
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
    #[arg(long, value_enum, default_value_t = ShutterMode::Global)]
    shutter_mode: ShutterMode,

    /// Total exposure time per frame
    #[arg(long, default_value_t = 0.0)]
    exposure_time: f64,

    /// Exposure time per line (rolling shutter mode only)
    #[arg(long, default_value_t = 0.0)]
    total_line_exposure_time: f64,

    /// Gamma correction for the PPM output
    #[arg(long, default_value_t = 2.0)]
    gamma: f64,

    /// Render surface normals instead of materials
    #[arg(long)]
    debug_normals: bool,

    /// Color prematurely terminated rays green
    #[arg(long)]
    debug_ray_terminations: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ShutterMode {
    Global,
    Rolling,
}

fn make_scene() -> Scene<3> {
    let camera = PinholeCamera::cartesian(
        vec3(0.0, 1.0, 4.0),
        vec3(0.0, 0.75, 3.0),
        vec3(0.0, 1.0, 0.0),
        70.0,
        16.0 / 9.0,
    );
    let mut scene = Scene::new(Box::new(camera));
    scene.active_background = Some(Box::new(SimpleSky::default()));

    let checker: Arc<dyn Texture<3>> = Arc::new(SurfaceChecker::new(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
        0.5,
    ));
    let mut ground = Plane::new().with_material(Arc::new(Diffuse::new(checker)));
    ground.finite_neg_x = false;
    ground.finite_pos_x = false;
    ground.finite_neg_y = false;
    ground.finite_pos_y = false;
    let mut floor = Instance::new(ground);
    floor.set_rotation(vec3(-std::f64::consts::FRAC_PI_2, 0.0, 0.0));
    scene.add(Box::new(floor));

    let matte: Arc<dyn Texture<3>> = Arc::new(VolumeChecker::new(
        Color::new(0.75, 0.45, 0.25),
        Color::new(0.55, 0.25, 0.15),
        0.25,
    ));
    scene.add(Box::new(
        Sphere::new(vec3(-1.2, 0.5, 0.0), 0.5).with_material(Arc::new(Diffuse::new(matte))),
    ));

    let mirror: Arc<dyn Texture<3>> =
        Arc::new(ConstantColor::new(Color::new(0.8, 0.8, 0.9)));
    scene.add(Box::new(
        Sphere::new(vec3(0.0, 0.5, 0.0), 0.5).with_material(Arc::new(Metal::new(mirror, 0.05))),
    ));

    let glass: Arc<dyn Texture<3>> = Arc::new(ConstantColor::new(Color::WHITE));
    scene.add(Box::new(
        Sphere::new(vec3(1.2, 0.5, 0.0), 0.5)
            .with_material(Arc::new(Dielectric::new(Arc::clone(&glass), 1.5))),
    ));
    // hollow interior: the negative radius flips the surface inside out
    scene.add(Box::new(
        Sphere::new(vec3(1.2, 0.5, 0.0), -0.4).with_material(Arc::new(Dielectric::new(glass, 1.5))),
    ));

    scene
}

fn save_ppm(path_stem: &str, image: &photon_geodesic::RawImage, scale: f64, gamma: f64) {
    let path = format!("{path_stem}.ppm");
    match File::create(&path) {
        Ok(file) => {
            let mut writer = BufWriter::new(file);
            if let Err(error) = photon_geodesic::image::write_image_ppm(&mut writer, image, scale, gamma)
            {
                log::error!("failed to write {path}: {error}");
            }
        }
        Err(error) => log::error!("cannot open {path}: {error}"),
    }
}

fn save_pfm(path_stem: &str, image: &photon_geodesic::RawImage, scale: f64) {
    let path = format!("{path_stem}.pfm");
    match File::create(&path) {
        Ok(file) => {
            let mut writer = BufWriter::new(file);
            if let Err(error) = photon_geodesic::image::write_image_pfm(&mut writer, image, scale) {
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
            save_pfm(&cli.out, &image, 1.0);
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("render failed: {error}");
            ExitCode::FAILURE
        }
    }
}
