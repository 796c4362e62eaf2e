//! Shutter semantics: global shutters expose every row at the same time,
//! rolling shutters shear moving objects across rows.

use photon_geodesic::geometry::Euclidean3;
use photon_geodesic::material::Emitter;
use photon_geodesic::math::{vec3, Scalar};
use photon_geodesic::texture::ConstantColor;
use photon_geodesic::world::{ConstantBackground, PinholeCamera, Scene, Sphere};
use photon_geodesic::{Canvas, Color, RawImage, Renderer, Shutter};
use std::sync::Arc;

const WIDTH: usize = 32;
const HEIGHT: usize = 4;

/// Scene with one emissive sphere translating linearly in +x. The narrow
/// field of view keeps the sphere inside every row of the short, wide
/// canvas for the whole sweep.
fn moving_sphere_scene() -> Scene<3> {
    let camera = PinholeCamera::cartesian(
        vec3(0.0, 0.0, 5.0),
        vec3(0.0, 0.0, 4.0),
        vec3(0.0, 1.0, 0.0),
        10.0,
        4.0,
    );
    let mut scene = Scene::new(Box::new(camera));
    scene.active_background = Some(Box::new(ConstantBackground::new(Color::BLACK)));

    let light = Arc::new(Emitter::new(Arc::new(ConstantColor::new(Color::WHITE))));
    let mut sphere = Sphere::new(vec3(-0.8, 0.0, 0.0), 0.5).with_material(light);
    sphere.animator = Some(Box::new(|time: Scalar, s: &mut Sphere<3>| {
        s.position = vec3(-0.8 + 1.6 * time, 0.0, 0.0);
    }));
    scene.add(Box::new(sphere));
    scene
}

fn renderer(shutter: Shutter) -> Renderer<3> {
    Renderer {
        canvas: Canvas {
            width: WIDTH,
            height: HEIGHT,
        },
        samples: 16,
        ray_depth: 2,
        shutter,
        ..Renderer::default()
    }
}

/// Brightness-weighted mean column of a row, or `None` for an empty row.
fn lit_center(image: &RawImage, row: usize) -> Option<Scalar> {
    let mut weight = 0.0;
    let mut moment = 0.0;
    for x in 0..WIDTH {
        let value = image[(x, row)].r;
        weight += value;
        moment += value * x as Scalar;
    }
    (weight > 0.1).then(|| moment / weight)
}

#[test]
fn global_shutter_exposes_all_rows_at_once() {
    let mut scene = moving_sphere_scene();
    let image = renderer(Shutter::Global { exposure_time: 0.0 })
        .render(&Euclidean3, &mut scene)
        .unwrap();

    let centers: Vec<Scalar> = (0..HEIGHT)
        .map(|row| lit_center(&image, row).expect("sphere must be visible in every row"))
        .collect();
    for center in &centers {
        assert!(
            (center - centers[0]).abs() < 1.0,
            "rows disagree on the sphere position: {centers:?}"
        );
    }
}

#[test]
fn rolling_shutter_shears_the_moving_sphere() {
    let mut scene = moving_sphere_scene();
    let image = renderer(Shutter::Rolling {
        frame_exposure_time: 1.0,
        total_line_exposure_time: 0.0,
    })
    .render(&Euclidean3, &mut scene)
    .unwrap();

    let centers: Vec<Scalar> = (0..HEIGHT)
        .map(|row| lit_center(&image, row).expect("sphere must be visible in every row"))
        .collect();
    // row j is frozen at time j/H, so the sphere shifts steadily from row
    // to row (the pinhole mirrors the sweep direction, so only the
    // consistency and size of the shift matter)
    let shifts: Vec<Scalar> = centers.windows(2).map(|pair| pair[1] - pair[0]).collect();
    for shift in &shifts {
        assert!(
            shift.abs() > 1.0 && shift.signum() == shifts[0].signum(),
            "rows must shift steadily: {centers:?}"
        );
    }
}
