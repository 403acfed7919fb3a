//! Simple path tracer example.
//!
//! Renders three spheres on a checkered ground in parallel and saves the
//! result as `output.ppm`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use ember_renderer::{
    render_parallel, BvhNode, Camera, CheckerTexture, Color, Dielectric, HittableList, Lambertian,
    Metal, ParallelOptions, RenderConfig, Sphere, Vec3,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = std::time::Instant::now();
    let world = build_scene();
    println!("Scene built in {:?}", start.elapsed());

    let mut camera = Camera::new()
        .with_aspect_ratio(400, 16.0 / 9.0)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 32,
        max_depth: 10,
        background: Color::new(0.7, 0.8, 1.0),
    };

    println!(
        "Rendering {}x{} @ {} spp...",
        camera.image_width, camera.image_height, config.samples_per_pixel
    );
    let start = std::time::Instant::now();
    let image = render_parallel(&camera, &world, &config, &ParallelOptions::default())?;
    println!("Rendered in {:?}", start.elapsed());

    let mut out = BufWriter::new(File::create("output.ppm")?);
    writeln!(out, "P3\n{} {}\n255", image.width, image.height)?;
    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(out, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }
    println!("Saved to output.ppm");
    Ok(())
}

fn build_scene() -> BvhNode {
    let ground = CheckerTexture::from_colors(0.32, Color::new(0.2, 0.3, 0.1), Color::splat(0.9));

    let mut world = HittableList::new();
    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::from_texture(Arc::new(ground)),
    ));
    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Dielectric::new(1.5)));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Lambertian::new(Color::new(0.4, 0.2, 0.1)),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    ));

    BvhNode::from(world)
}
