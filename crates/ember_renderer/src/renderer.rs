//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Emission from lights, constant background on miss
//! - Anti-aliasing via multi-sampling

use crate::{Camera, Color, Hittable, Ray, RenderError, RenderResult};
use ember_math::Interval;
use rand::RngCore;

/// Closest distance a secondary ray may hit, to avoid self-intersection.
pub const RAY_T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Radiance returned by rays that escape the scene
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
        }
    }
}

impl RenderConfig {
    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }
        if !self.background.is_finite() {
            return Err(RenderError::InvalidConfig(format!(
                "background must be finite, got {}",
                self.background
            )));
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(RAY_T_MIN, f32::INFINITY), rng) else {
        return config.background;
    };

    // Get emission from material (for lights)
    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, depth - 1, config, rng);
            emission + result.attenuation * scattered_color
        }
        // Absorbed: only what the surface emits
        None => emission,
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    const INTENSITY: Interval = Interval::new(0.0, 0.999);

    let to_byte = |c: f32| {
        // NaN samples count as black
        let c = if c.is_nan() { 0.0 } else { c };
        (256.0 * INTENSITY.clamp(linear_to_gamma(c))) as u8
    };
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, config.max_depth, config, rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Linear-color image stored row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Gamma-corrected 8-bit RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }
}

/// Render the entire scene to an image buffer on the calling thread.
///
/// Fails before tracing any ray if `config` is invalid.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> RenderResult<ImageBuffer> {
    config.validate()?;

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, world, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BvhNode, DiffuseLight, HittableList, Lambertian, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(samples_per_pixel: u32, max_depth: u32, background: Color) -> RenderConfig {
        RenderConfig {
            samples_per_pixel,
            max_depth,
            background,
        }
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(50.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, -1.0, f32::NAN)), [128, 0, 0]);
    }

    #[test]
    fn test_validate_rejects_zero_samples() {
        let bad = config(0, 10, Color::ZERO);
        assert!(matches!(bad.validate(), Err(RenderError::InvalidConfig(_))));
        assert!(config(1, 0, Color::ZERO).validate().is_ok());
    }

    #[test]
    fn test_render_rejects_invalid_config_before_tracing() {
        let mut camera = Camera::new().with_resolution(4, 4);
        camera.initialize();
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);

        let result = render(&camera, &world, &config(0, 5, Color::ZERO), &mut rng);
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_depth_zero_is_black() {
        let world = HittableList::new();
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        let color = ray_color(&ray, &world, 0, &config(1, 0, Color::ONE), &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_miss_returns_background() {
        let world = HittableList::new();
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);
        let background = Color::new(0.7, 0.8, 1.0);

        let color = ray_color(&ray, &world, 10, &config(1, 10, background), &mut rng);
        assert_eq!(color, background);
    }

    #[test]
    fn test_light_contributes_emission_only() {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            DiffuseLight::new(Color::splat(4.0)),
        ));
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        let color = ray_color(&ray, &world, 5, &config(1, 5, Color::ONE), &mut rng);
        assert_eq!(color, Color::splat(4.0));
    }

    #[test]
    fn test_diffuse_surface_attenuates_background() {
        let mut world = HittableList::new();
        world.add(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, Lambertian::new(Color::splat(0.5))));
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        // Depth 1: hit, scatter, then the recursive call is cut off
        let cut = ray_color(&ray, &world, 1, &config(1, 1, Color::ONE), &mut rng);
        assert_eq!(cut, Color::ZERO);

        // Depth 2: the scattered ray leaves a convex object and sees the sky
        let lit = ray_color(&ray, &world, 2, &config(1, 2, Color::ONE), &mut rng);
        assert_eq!(lit, Color::splat(0.5));
    }

    #[test]
    fn test_render_pixel() {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::new(0.5, 0.5, 0.5)),
        );
        let world = BvhNode::new(vec![Box::new(sphere)]);

        let mut camera = Camera::new().with_resolution(10, 10);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);

        // Center pixel hits the sphere, then bounces to the background
        let sky = config(4, 5, Color::new(0.5, 0.7, 1.0));
        let color = render_pixel(&camera, &world, 5, 5, &sky, &mut rng);
        assert!(color.length() > 0.0);
    }

    #[test]
    fn test_render_fills_buffer() {
        let mut camera = Camera::new().with_resolution(3, 2);
        camera.initialize();
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(1);

        let sky = config(2, 3, Color::new(0.1, 0.2, 0.3));
        let image = render(&camera, &world, &sky, &mut rng).unwrap();
        assert_eq!(image.pixels.len(), 6);
        assert!(image
            .pixels
            .iter()
            .all(|p| (*p - Color::new(0.1, 0.2, 0.3)).length() < 1e-6));
        assert_eq!(image.to_rgb8().len(), 18);
    }
}
