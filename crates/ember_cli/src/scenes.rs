//! Built-in scene catalogue.
//!
//! Each builder returns the world, already wrapped in a BVH, plus the
//! settings it is meant to be rendered with.

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use ember_core::{load_obj, Mesh};
use ember_math::Vec3;
use ember_renderer::sampling::{gen_f32, gen_range, random_vec3};
use ember_renderer::{
    cuboid, mesh_to_triangles, BvhNode, CheckerTexture, Color, ConstantMedium, Dielectric,
    DiffuseLight, Hittable, HittableList, ImageTexture, Lambertian, Material, Metal,
    NoiseTexture, Quad, RotateY, Sphere, Texture, Translate, Triangle,
};
use rand::rngs::StdRng;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    BouncingSpheres,
    CheckeredSpheres,
    Earth,
    PerlinSpheres,
    Quads,
    SimpleLight,
    CornellBox,
    CornellSmoke,
    Triangles,
    Mesh,
    Final,
    NeonBar,
    TwoSpheres,
}

/// Files some scenes read from disk.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub texture: PathBuf,
    pub mesh: PathBuf,
}

pub struct Scene {
    pub world: BvhNode,
    pub settings: Settings,
}

impl Scene {
    fn new(world: HittableList, settings: Settings) -> Self {
        Self {
            world: BvhNode::from(world),
            settings,
        }
    }
}

/// Build a scene. `rng` drives random placement and procedural textures.
pub fn build(kind: SceneKind, assets: &SceneAssets, rng: &mut StdRng) -> Scene {
    log::info!("Building scene {kind:?}");
    match kind {
        SceneKind::BouncingSpheres => bouncing_spheres(rng),
        SceneKind::CheckeredSpheres => checkered_spheres(),
        SceneKind::Earth => earth(assets),
        SceneKind::PerlinSpheres => perlin_spheres(rng),
        SceneKind::Quads => quads(assets),
        SceneKind::SimpleLight => simple_light(rng),
        SceneKind::CornellBox => cornell_box(),
        SceneKind::CornellSmoke => cornell_smoke(),
        SceneKind::Triangles => triangles(),
        SceneKind::Mesh => mesh(assets),
        SceneKind::Final => final_scene(assets, rng),
        SceneKind::NeonBar => neon_bar(rng),
        SceneKind::TwoSpheres => two_spheres(false),
    }
}

fn checker() -> Arc<dyn Texture> {
    Arc::new(CheckerTexture::from_colors(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
    ))
}

pub fn bouncing_spheres(rng: &mut StdRng) -> Scene {
    let mut world = HittableList::new();
    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::from_texture(checker()),
    ));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                let center2 = center + Vec3::new(0.0, gen_range(rng, 0.0, 0.5), 0.0);
                world.add(Sphere::moving(center, center2, 0.2, Lambertian::new(albedo)));
            } else if choose_mat < 0.95 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                world.add(Sphere::new(center, 0.2, Metal::new(albedo, fuzz)));
            } else {
                world.add(Sphere::new(center, 0.2, Dielectric::new(1.5)));
            }
        }
    }

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

    let settings = Settings {
        defocus_angle: 0.6,
        focus_dist: 10.0,
        ..Settings::default()
    };
    Scene::new(world, settings)
}

pub fn checkered_spheres() -> Scene {
    let surface = Lambertian::from_texture(checker());

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0, surface.clone()));
    world.add(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0, surface));

    Scene::new(world, Settings::default())
}

pub fn earth(assets: &SceneAssets) -> Scene {
    let surface = Lambertian::from_texture(Arc::new(ImageTexture::open(&assets.texture)));

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::ZERO, 2.0, surface));

    let settings = Settings {
        look_from: Vec3::new(0.0, 0.0, 12.0),
        ..Settings::default()
    };
    Scene::new(world, settings)
}

pub fn perlin_spheres(rng: &mut StdRng) -> Scene {
    let marble = Lambertian::from_texture(Arc::new(NoiseTexture::new(4.0, rng)));

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone()));
    world.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble));

    Scene::new(world, Settings::default())
}

pub fn quads(assets: &SceneAssets) -> Scene {
    let left_red = Lambertian::new(Color::new(1.0, 0.2, 0.2));
    let back_image = Lambertian::from_texture(Arc::new(ImageTexture::open(&assets.texture)));
    let right_blue = Lambertian::new(Color::new(0.2, 0.2, 1.0));
    let upper_orange = Lambertian::new(Color::new(1.0, 0.5, 0.0));
    let lower_teal = Lambertian::new(Color::new(0.2, 0.8, 0.8));

    let mut world = HittableList::new();
    world.add(Quad::new(
        Vec3::new(-3.0, -2.0, 5.0),
        Vec3::new(0.0, 0.0, -4.0),
        Vec3::new(0.0, 4.0, 0.0),
        left_red,
    ));
    world.add(Quad::new(
        Vec3::new(-2.0, -2.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
        back_image,
    ));
    world.add(Quad::new(
        Vec3::new(3.0, -2.0, 1.0),
        Vec3::new(0.0, 0.0, 4.0),
        Vec3::new(0.0, 4.0, 0.0),
        right_blue,
    ));
    world.add(Quad::new(
        Vec3::new(-2.0, 3.0, 1.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        upper_orange,
    ));
    world.add(Quad::new(
        Vec3::new(-2.0, -3.0, 5.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -4.0),
        lower_teal,
    ));

    let settings = Settings {
        aspect_ratio: 1.0,
        vfov: 80.0,
        look_from: Vec3::new(0.0, 0.0, 9.0),
        ..Settings::default()
    };
    Scene::new(world, settings)
}

pub fn simple_light(rng: &mut StdRng) -> Scene {
    let marble = Lambertian::from_texture(Arc::new(NoiseTexture::new(4.0, rng)));
    let light = DiffuseLight::new(Color::splat(4.0));

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone()));
    world.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble));
    world.add(Sphere::new(Vec3::new(0.0, 7.0, 0.0), 2.0, light.clone()));
    world.add(Quad::new(
        Vec3::new(3.0, 1.0, -2.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        light,
    ));

    let settings = Settings {
        background: Color::ZERO,
        look_from: Vec3::new(26.0, 3.0, 6.0),
        look_at: Vec3::new(0.0, 2.0, 0.0),
        ..Settings::default()
    };
    Scene::new(world, settings)
}

fn cornell_settings() -> Settings {
    Settings {
        image_width: 600,
        aspect_ratio: 1.0,
        samples_per_pixel: 200,
        background: Color::ZERO,
        vfov: 40.0,
        look_from: Vec3::new(278.0, 278.0, -800.0),
        look_at: Vec3::new(278.0, 278.0, 0.0),
        ..Settings::default()
    }
}

/// Red, green and white walls of the 555-unit box. The ceiling light is
/// left to the caller.
fn cornell_walls(world: &mut HittableList, white: &Lambertian) {
    let red = Lambertian::new(Color::new(0.65, 0.05, 0.05));
    let green = Lambertian::new(Color::new(0.12, 0.45, 0.15));

    world.add(Quad::new(
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    ));
    world.add(Quad::new(
        Vec3::ZERO,
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    ));
    world.add(Quad::new(
        Vec3::ZERO,
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    ));
    world.add(Quad::new(
        Vec3::new(555.0, 555.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white.clone(),
    ));
    world.add(Quad::new(
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white.clone(),
    ));
}

/// The tall and the short block, rotated and moved into place.
fn cornell_blocks(white: &Lambertian) -> [Translate<RotateY<HittableList>>; 2] {
    let tall = cuboid(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white.clone());
    let short = cuboid(Vec3::ZERO, Vec3::splat(165.0), white.clone());
    [
        Translate::new(RotateY::new(tall, 15.0), Vec3::new(265.0, 0.0, 295.0)),
        Translate::new(RotateY::new(short, -18.0), Vec3::new(130.0, 0.0, 65.0)),
    ]
}

pub fn cornell_box() -> Scene {
    let white = Lambertian::new(Color::splat(0.73));

    let mut world = HittableList::new();
    cornell_walls(&mut world, &white);
    world.add(Quad::new(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        DiffuseLight::new(Color::splat(15.0)),
    ));
    for block in cornell_blocks(&white) {
        world.add(block);
    }

    Scene::new(world, cornell_settings())
}

pub fn cornell_smoke() -> Scene {
    let white = Lambertian::new(Color::splat(0.73));

    let mut world = HittableList::new();
    cornell_walls(&mut world, &white);
    world.add(Quad::new(
        Vec3::new(113.0, 554.0, 127.0),
        Vec3::new(330.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 305.0),
        DiffuseLight::new(Color::splat(7.0)),
    ));

    let [tall, short] = cornell_blocks(&white);
    world.add(ConstantMedium::new(tall, 0.01, Color::ZERO));
    world.add(ConstantMedium::new(short, 0.01, Color::ONE));

    Scene::new(world, cornell_settings())
}

pub fn triangles() -> Scene {
    let purple = Lambertian::new(Color::new(0.8, 0.3, 0.9));
    let orange = Lambertian::new(Color::new(0.9, 0.4, 0.1));
    let teal = Lambertian::new(Color::new(0.2, 0.8, 0.8));
    let gold = Metal::new(Color::new(0.8, 0.6, 0.2), 0.3);
    let light = DiffuseLight::new(Color::splat(4.0));

    let mut world = HittableList::new();
    world.add(Triangle::new(
        Vec3::new(-2.0, 0.0, -2.0),
        Vec3::new(-1.0, 0.0, -2.0),
        Vec3::new(-1.5, 2.0, -1.5),
        purple,
    ));
    world.add(Triangle::new(
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(2.0, 0.0, -1.0),
        Vec3::new(1.5, 1.5, 0.0),
        orange,
    ));
    world.add(Triangle::new(
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::new(-0.5, 2.0, 1.5),
        teal,
    ));
    world.add(Triangle::new(
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(1.5, 0.5, 0.0),
        Vec3::new(1.0, 2.0, 1.0),
        gold,
    ));

    world.add(Quad::new(
        Vec3::new(-2.0, 5.0, -2.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        light.clone(),
    ));
    world.add(Quad::new(
        Vec3::new(2.0, 4.0, 2.0),
        Vec3::new(-3.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -3.0),
        light,
    ));
    world.add(Quad::new(
        Vec3::new(-10.0, -0.01, -10.0),
        Vec3::new(20.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 20.0),
        Lambertian::new(Color::splat(0.2)),
    ));

    let settings = Settings {
        background: Color::new(0.1, 0.1, 0.15),
        vfov: 45.0,
        look_from: Vec3::new(4.0, 3.0, 4.0),
        look_at: Vec3::new(0.0, 1.0, 0.0),
        defocus_angle: 0.4,
        focus_dist: 5.5,
        ..Settings::default()
    };
    Scene::new(world, settings)
}

pub fn mesh(assets: &SceneAssets) -> Scene {
    let mesh = load_obj(&assets.mesh).unwrap_or_else(|e| {
        log::warn!("{e}; rendering the scene without the mesh");
        Mesh::empty()
    });
    let model = mesh_to_triangles(&mesh, Metal::new(Color::new(0.7, 0.3, 0.3), 0.1));

    let mut world = HittableList::new();
    world.add(BvhNode::from(model));
    world.add(Quad::new(
        Vec3::new(-1.0, 8.0, -1.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        DiffuseLight::new(Color::splat(15.0)),
    ));
    world.add(Quad::new(
        Vec3::new(-15.0, -2.0, -15.0),
        Vec3::new(30.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 30.0),
        Lambertian::new(Color::splat(0.2)),
    ));

    let settings = Settings {
        image_width: 250,
        background: Color::new(0.1, 0.1, 0.15),
        vfov: 40.0,
        look_from: Vec3::new(6.0, 4.0, 6.0),
        defocus_angle: 0.2,
        focus_dist: 10.0,
        ..Settings::default()
    };
    Scene::new(world, settings)
}

pub fn final_scene(assets: &SceneAssets, rng: &mut StdRng) -> Scene {
    let ground = Lambertian::new(Color::new(0.48, 0.83, 0.53));
    let mut boxes = HittableList::new();
    const BOXES_PER_SIDE: usize = 20;
    for i in 0..BOXES_PER_SIDE {
        for j in 0..BOXES_PER_SIDE {
            let w = 100.0;
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = gen_range(rng, 1.0, 101.0);
            boxes.add(cuboid(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            ));
        }
    }

    let mut world = HittableList::new();
    world.add(BvhNode::from(boxes));

    world.add(Quad::new(
        Vec3::new(123.0, 554.0, 147.0),
        Vec3::new(300.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 265.0),
        DiffuseLight::new(Color::splat(7.0)),
    ));

    let center1 = Vec3::new(400.0, 400.0, 200.0);
    world.add(Sphere::moving(
        center1,
        center1 + Vec3::new(30.0, 0.0, 0.0),
        50.0,
        Lambertian::new(Color::new(0.7, 0.3, 0.1)),
    ));
    world.add(Sphere::new(Vec3::new(260.0, 150.0, 45.0), 50.0, Dielectric::new(1.5)));
    world.add(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Metal::new(Color::new(0.8, 0.8, 0.9), 1.0),
    ));

    // Glass ball filled with blue fog
    let boundary = Arc::new(Sphere::new(
        Vec3::new(360.0, 150.0, 145.0),
        70.0,
        Dielectric::new(1.5),
    ));
    world.add(boundary.clone());
    world.add(ConstantMedium::new(boundary, 0.2, Color::new(0.2, 0.4, 0.9)));
    // Thin mist over everything
    world.add(ConstantMedium::new(
        Sphere::new(Vec3::ZERO, 5000.0, Dielectric::new(1.5)),
        0.0001,
        Color::ONE,
    ));

    world.add(Sphere::new(
        Vec3::new(400.0, 200.0, 400.0),
        100.0,
        Lambertian::from_texture(Arc::new(ImageTexture::open(&assets.texture))),
    ));
    world.add(Sphere::new(
        Vec3::new(220.0, 280.0, 300.0),
        80.0,
        Lambertian::from_texture(Arc::new(NoiseTexture::new(0.2, rng))),
    ));

    let white = Lambertian::new(Color::splat(0.73));
    let cluster: Vec<Box<dyn Hittable>> = (0..1000)
        .map(|_| -> Box<dyn Hittable> {
            Box::new(Sphere::new(random_vec3(rng, 0.0, 165.0), 10.0, white.clone()))
        })
        .collect();
    world.add(Translate::new(
        RotateY::new(BvhNode::new(cluster), 15.0),
        Vec3::new(-100.0, 270.0, 395.0),
    ));

    let settings = Settings {
        aspect_ratio: 1.0,
        samples_per_pixel: 250,
        max_depth: 4,
        background: Color::ZERO,
        vfov: 40.0,
        look_from: Vec3::new(478.0, 278.0, -600.0),
        look_at: Vec3::new(278.0, 278.0, 0.0),
        ..Settings::default()
    };
    Scene::new(world, settings)
}

/// Neon sign on a bar wall, seen through light fog, with glasses on the
/// counter.
pub fn neon_bar(rng: &mut StdRng) -> Scene {
    let neon: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(15.0, 0.2, 0.2)));
    let glass = Dielectric::new(1.5);
    let chrome = Metal::new(Color::splat(0.8), 0.0);

    let mut world = HittableList::new();

    // Counter and back wall
    world.add(Quad::new(
        Vec3::new(-8.0, 0.0, -4.0),
        Vec3::new(16.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 8.0),
        Metal::new(Color::splat(0.4), 0.1),
    ));
    world.add(Quad::new(
        Vec3::new(-8.0, 0.0, 5.0),
        Vec3::new(16.0, 0.0, 0.0),
        Vec3::new(0.0, 8.0, 0.0),
        Lambertian::from_texture(Arc::new(NoiseTexture::new(2.0, rng))),
    ));

    // Sign strokes as (corner, width edge, height edge)
    let strokes = [
        ((3.5, 2.0), (0.5, 0.0), (0.0, 3.0)),
        ((1.75, 4.5), (-1.5, 0.0), (0.0, 0.4)),
        ((1.75, 4.5), (-0.4, 0.0), (0.0, -1.2)),
        ((1.75, 3.3), (-1.5, 0.0), (0.0, 0.4)),
        ((0.25, 3.3), (-0.4, 0.0), (0.0, -1.2)),
        ((1.75, 2.1), (-1.5, 0.0), (0.0, 0.4)),
        ((-1.0, 4.5), (-0.5, 0.0), (0.0, -2.4)),
        ((-1.0, 2.1), (-1.5, 0.0), (0.0, 0.4)),
        ((-2.5, 4.5), (-0.5, 0.0), (0.0, -2.4)),
    ];
    for ((x, y), (ux, uy), (vx, vy)) in strokes {
        world.add(Quad::new(
            Vec3::new(x, y, 4.5),
            Vec3::new(ux, uy, 0.0),
            Vec3::new(vx, vy, 0.0),
            neon.clone(),
        ));
    }

    world.add(ConstantMedium::new(
        Sphere::new(Vec3::new(0.0, 3.0, 4.8), 4.0, Lambertian::new(Color::ZERO)),
        0.01,
        Color::splat(0.8),
    ));

    // Every other glass is wobbling; each holds a drifting ice cube
    for i in 0..5 {
        let center = Vec3::new(-6.0 + i as f32 * 3.0, 0.5, 0.0);
        if i % 2 == 0 {
            world.add(Sphere::new(center, 0.4, glass.clone()));
        } else {
            world.add(Sphere::moving(
                center,
                center + Vec3::new(0.0, 0.3, 0.0),
                0.4,
                glass.clone(),
            ));
        }

        let ice = Vec3::new(-5.8 + i as f32 * 3.0, 0.8, 0.0);
        world.add(Sphere::moving(
            ice,
            ice + Vec3::new(0.3, 0.2, 0.1),
            0.2,
            chrome.clone(),
        ));
    }

    world.add(Quad::new(
        Vec3::new(-8.0, 8.0, -4.0),
        Vec3::new(16.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 12.0),
        DiffuseLight::new(Color::splat(0.6)),
    ));

    let settings = Settings {
        image_width: 800,
        samples_per_pixel: 500,
        background: Color::splat(0.02),
        vfov: 60.0,
        look_from: Vec3::new(0.0, 3.0, -10.0),
        look_at: Vec3::new(0.0, 3.0, 4.5),
        defocus_angle: 0.2,
        focus_dist: 10.0,
        ..Settings::default()
    };
    Scene::new(world, settings)
}

/// A red and a blue light filling opposite corners of the view, or blue and
/// red when `swapped`.
pub fn two_spheres(swapped: bool) -> Scene {
    let red: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(1.0, 0.0, 0.0)));
    let blue: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(0.0, 0.0, 1.0)));
    let (near, far) = if swapped { (blue, red) } else { (red, blue) };

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(-2.0, 2.0, -4.0), 3.0, near));
    world.add(Sphere::new(Vec3::new(4.0, -4.0, -8.0), 6.0, far));

    let settings = Settings {
        image_width: 2,
        aspect_ratio: 1.0,
        samples_per_pixel: 1,
        max_depth: 1,
        background: Color::ZERO,
        vfov: 90.0,
        look_from: Vec3::ZERO,
        look_at: -Vec3::Z,
        focus_dist: 1.0,
        ..Settings::default()
    };
    Scene::new(world, settings)
}
