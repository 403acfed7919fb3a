//! Ember renderer - CPU Monte Carlo path tracing
//!
//! Geometry, materials and textures form an immutable scene graph that is
//! traced by a depth-limited recursive integrator, either on one thread
//! ([`render`]) or in parallel buckets ([`render_parallel`]).

mod bucket;
mod bvh;
mod camera;
mod constant_medium;
mod error;
mod hittable;
mod instance;
mod material;
mod mesh;
mod perlin;
mod quad;
mod renderer;
pub mod sampling;
mod sphere;
mod texture;
mod triangle;

pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, CancelToken,
    ParallelOptions, DEFAULT_BUCKET_SIZE,
};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use constant_medium::ConstantMedium;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{RotateY, Translate};
pub use material::{
    reflect, refract, Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal,
    ScatterResult,
};
pub use mesh::mesh_to_triangles;
pub use perlin::Perlin;
pub use quad::{cuboid, Quad};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render, render_pixel, ImageBuffer, RenderConfig,
    RAY_T_MIN,
};
pub use sphere::Sphere;
pub use texture::{
    CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, MISSING_TEXTURE_COLOR,
};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
