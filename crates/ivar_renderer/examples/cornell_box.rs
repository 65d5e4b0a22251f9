//! Example: render a Cornell box.
//!
//! Run with: cargo run --release --example cornell_box -- [samples_per_pixel] [naive|sah]
//!
//! Prints BVH and render statistics; writing the image to disk is left to the caller.

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use ivar_renderer::{
    render_parallel, Camera, Color, DiffuseLight, Lambertian, Mirror, Primitive, RenderConfig,
    Scene, Sphere, SplitMethod, TriangleMesh, Vec3,
};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let samples_per_pixel = match args.get(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("Invalid sample count: {}", arg))?,
        None => 64,
    };
    let split_method = match args.get(2).map(String::as_str) {
        None | Some("sah") => SplitMethod::Sah,
        Some("naive") => SplitMethod::Naive,
        Some(other) => anyhow::bail!("Unknown split method: {} (expected naive or sah)", other),
    };

    let start = Instant::now();
    let scene = Scene::build(build_cornell_box()?, split_method);
    log::info!(
        "Scene ready in {:?}: {} primitives, emissive area {:.4}",
        start.elapsed(),
        scene.len(),
        scene.emissive_area()
    );

    let mut camera = Camera::new()
        .with_resolution(256, 256)
        .with_position(Vec3::new(0.5, 0.5, -1.35), Vec3::new(0.5, 0.5, 0.5), Vec3::Y)
        .with_fov(40.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel,
        bucket_size: 32,
        seed: 1,
    };

    let image = render_parallel(&camera, &scene, &config).context("Render failed")?;

    let mean = image.mean();
    let rgba = image.to_rgba();
    let lit = rgba.chunks_exact(4).filter(|px| px[..3].iter().any(|&c| c > 0)).count();
    log::info!(
        "Mean radiance ({:.4}, {:.4}, {:.4}), {} of {} pixels lit",
        mean.x,
        mean.y,
        mean.z,
        lit,
        image.pixels.len()
    );

    Ok(())
}

/// Unit Cornell box, open towards -z, with a square ceiling light.
///
/// Quads are wound counter-clockwise as seen from inside the box so every
/// wall normal points into the room.
fn build_cornell_box() -> Result<Vec<Box<dyn Primitive>>> {
    let white = || Lambertian::new(Color::splat(0.73));
    let red = Lambertian::new(Color::new(0.65, 0.05, 0.05));
    let green = Lambertian::new(Color::new(0.12, 0.45, 0.15));
    let light = DiffuseLight::new(Color::splat(15.0)).with_albedo(Color::splat(0.78));

    let v = Vec3::new;
    let h = 0.998;

    let primitives: Vec<Box<dyn Primitive>> = vec![
        // Floor
        Box::new(TriangleMesh::quad(
            v(0.0, 0.0, 0.0),
            v(0.0, 0.0, 1.0),
            v(1.0, 0.0, 1.0),
            v(1.0, 0.0, 0.0),
            white(),
        )?),
        // Ceiling
        Box::new(TriangleMesh::quad(
            v(0.0, 1.0, 0.0),
            v(1.0, 1.0, 0.0),
            v(1.0, 1.0, 1.0),
            v(0.0, 1.0, 1.0),
            white(),
        )?),
        // Back wall
        Box::new(TriangleMesh::quad(
            v(0.0, 0.0, 1.0),
            v(0.0, 1.0, 1.0),
            v(1.0, 1.0, 1.0),
            v(1.0, 0.0, 1.0),
            white(),
        )?),
        // Left wall
        Box::new(TriangleMesh::quad(
            v(0.0, 0.0, 0.0),
            v(0.0, 1.0, 0.0),
            v(0.0, 1.0, 1.0),
            v(0.0, 0.0, 1.0),
            red,
        )?),
        // Right wall
        Box::new(TriangleMesh::quad(
            v(1.0, 0.0, 0.0),
            v(1.0, 0.0, 1.0),
            v(1.0, 1.0, 1.0),
            v(1.0, 1.0, 0.0),
            green,
        )?),
        // Ceiling light, facing down
        Box::new(TriangleMesh::quad(
            v(0.35, h, 0.35),
            v(0.65, h, 0.35),
            v(0.65, h, 0.65),
            v(0.35, h, 0.65),
            light,
        )?),
        Box::new(Sphere::new(v(0.3, 0.2, 0.62), 0.2, white())),
        Box::new(Sphere::new(v(0.72, 0.17, 0.36), 0.17, Mirror::new(Color::splat(0.9)))),
    ];

    Ok(primitives)
}
