//! End-to-end renders through curved geometries.

use photon_geodesic::geometry::{RayIntegration, Schwarzschild, Swirl, TwistedOrb};
use photon_geodesic::material::Emitter;
use photon_geodesic::math::{vec3, vec4};
use photon_geodesic::texture::ConstantColor;
use photon_geodesic::world::{
    ConstantBackground, PerspectiveCamera4, PinholeCamera, Scene, Sphere,
};
use photon_geodesic::{Canvas, Color, Renderer, Shutter};
use std::sync::Arc;

fn emissive_sphere_scene_3d() -> Scene<3> {
    let camera = PinholeCamera::cartesian(
        vec3(0.0, 0.0, 6.0),
        vec3(0.0, 0.0, 5.0),
        vec3(0.0, 1.0, 0.0),
        90.0,
        1.0,
    );
    let mut scene = Scene::new(Box::new(camera));
    scene.active_background = Some(Box::new(ConstantBackground::new(Color::new(
        0.0, 0.0, 0.25,
    ))));
    let light = Arc::new(Emitter::new(Arc::new(ConstantColor::new(Color::WHITE))));
    // large enough that even the extreme corner jitter of a 2x2 canvas at
    // 90 degrees field of view still lands on it
    scene.add(Box::new(
        Sphere::new(vec3(0.0, 0.0, 1.0), 3.9).with_material(light),
    ));
    scene
}

fn tiny_renderer<const N: usize>() -> Renderer<N> {
    Renderer {
        canvas: Canvas {
            width: 2,
            height: 2,
        },
        samples: 2,
        ray_depth: 3,
        shutter: Shutter::Global { exposure_time: 0.0 },
        ..Renderer::default()
    }
}

#[test]
fn swirl_with_zero_strength_renders_like_flat_space() {
    let integration = RayIntegration::new(0.5, 1e-8, 1e-8, 50.0, 1.1).unwrap();
    let geometry = Swirl::new(0.0, integration);
    let mut scene = emissive_sphere_scene_3d();
    let image = tiny_renderer().render(&geometry, &mut scene).unwrap();
    // the central rays hit the big emitter dead on
    for pixel in image.pixels() {
        assert!(pixel.r > 0.99, "expected emitter hits, got {pixel}");
    }
}

#[test]
fn twisted_orb_renders_finite_radiance() {
    let integration = RayIntegration::new(0.5, 1e-6, 1e-6, 50.0, 1.1).unwrap();
    let geometry = TwistedOrb::new(0.4, 2.0, integration);
    let mut scene = emissive_sphere_scene_3d();
    let image = tiny_renderer().render(&geometry, &mut scene).unwrap();
    for pixel in image.pixels() {
        assert!(pixel.r.is_finite() && pixel.g.is_finite() && pixel.b.is_finite());
        assert!(pixel.r >= 0.0);
    }
}

#[test]
fn schwarzschild_scene_renders_finite_radiance() {
    let integration = RayIntegration::new(0.5, 1e-6, 1e-6, 30.0, 1.1).unwrap();
    let geometry = Schwarzschild::new(1.0, 0.25, integration);

    let camera = PerspectiveCamera4::far_perspective(
        vec3(0.0, 0.0, 3.0),
        vec3(0.0, 0.0, -3.0),
        vec3(0.0, 1.0, 0.0),
        90.0,
        1.0,
        1.0,
    );
    let mut scene = Scene::new(Box::new(camera));
    scene.active_background = Some(Box::new(ConstantBackground::new(Color::new(
        0.5, 0.7, 1.0,
    ))));
    let light = Arc::new(Emitter::new(Arc::new(ConstantColor::new(Color::WHITE))));
    scene.add(Box::new(
        Sphere::new(vec4(1.5, 1.5, -2.0, 0.0), 0.5).with_material(light),
    ));

    let image = tiny_renderer().render(&geometry, &mut scene).unwrap();
    for pixel in image.pixels() {
        assert!(pixel.r.is_finite() && pixel.g.is_finite() && pixel.b.is_finite());
    }
}
