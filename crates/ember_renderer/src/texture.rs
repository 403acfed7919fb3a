//! Textures: functions from surface coordinates and position to color.

use std::path::Path;
use std::sync::Arc;

use crate::{Color, Perlin};
use ember_core::{srgb_to_linear, ImageData};
use ember_math::{Interval, Vec3};
use rand::RngCore;

/// Returned by image textures whose image failed to load.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// Trait for spatially varying colors.
pub trait Texture: Send + Sync {
    /// Color at surface coordinates `(u, v)` and world-space point `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

impl<T: Texture + ?Sized> Texture for Arc<T> {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        (**self).value(u, v, p)
    }
}

/// Constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// Solid 3-D checkerboard.
///
/// The pattern depends only on the hit point, so it stays consistent across
/// curved surfaces regardless of their UV parameterization.
#[derive(Clone)]
pub struct CheckerTexture {
    scale: f32,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    /// Checker with cells `cell_size` units wide.
    pub fn new(cell_size: f32, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            scale: 1.0 / cell_size,
            even,
            odd,
        }
    }

    pub fn from_colors(cell_size: f32, even: Color, odd: Color) -> Self {
        Self::new(
            cell_size,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let x = (self.scale * p.x).floor() as i64;
        let y = (self.scale * p.y).floor() as i64;
        let z = (self.scale * p.z).floor() as i64;

        if (x + y + z).rem_euclid(2) == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// Bilinearly filtered lookup into a decoded image.
#[derive(Clone)]
pub struct ImageTexture {
    image: Option<Arc<ImageData>>,
}

impl ImageTexture {
    pub fn new(image: Arc<ImageData>) -> Self {
        Self { image: Some(image) }
    }

    /// Load an image from disk. A file that cannot be decoded is logged and
    /// rendered as [`MISSING_TEXTURE_COLOR`].
    pub fn open(path: impl AsRef<Path>) -> Self {
        match ImageData::load(path.as_ref()) {
            Ok(image) => Self::new(Arc::new(image)),
            Err(e) => {
                log::warn!("{e}; using placeholder color");
                Self::missing()
            }
        }
    }

    /// A texture without image data.
    pub fn missing() -> Self {
        Self { image: None }
    }

    fn texel(image: &ImageData, x: u32, y: u32) -> Color {
        let [r, g, b] = image.pixel(x, y);
        Color::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(image) = &self.image else {
            return MISSING_TEXTURE_COLOR;
        };

        let u = Interval::UNIT.clamp(u);
        // Flip V to image coordinates (row 0 is the top)
        let v = 1.0 - Interval::UNIT.clamp(v);

        let x = u * (image.width() - 1) as f32;
        let y = v * (image.height() - 1) as f32;

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        // pixel() clamps the +1 neighbours at the right and bottom edges
        let top = Self::texel(image, x0, y0).lerp(Self::texel(image, x0 + 1, y0), fx);
        let bottom = Self::texel(image, x0, y0 + 1).lerp(Self::texel(image, x0 + 1, y0 + 1), fx);

        top.lerp(bottom, fy)
    }
}

/// Marble-like procedural texture driven by Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    /// `scale` sets the stripe frequency along Z.
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turbulence(p, 7);
        Color::splat(0.5 * (1.0 + phase.sin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const WHITE: Color = Color::ONE;
    const BLACK: Color = Color::ZERO;

    #[test]
    fn test_solid_color() {
        let tex = SolidColor::new(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.3, 0.9, Vec3::splat(7.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates_in_3d() {
        let tex = CheckerTexture::from_colors(1.0, WHITE, BLACK);

        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5)), WHITE);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5)), BLACK);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 1.5, 0.5)), WHITE);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 1.5, 1.5)), BLACK);

        // Negative cells: floor(-0.5) = -1 is odd
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(-0.5, 0.5, 0.5)), BLACK);
    }

    #[test]
    fn test_checker_ignores_uv() {
        let tex = CheckerTexture::from_colors(0.32, WHITE, BLACK);
        let p = Vec3::new(0.1, 0.1, 0.1);

        assert_eq!(tex.value(0.0, 0.0, p), tex.value(0.9, 0.4, p));
    }

    #[test]
    fn test_checker_cell_size() {
        let tex = CheckerTexture::from_colors(2.0, WHITE, BLACK);

        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.9, 0.5, 0.5)), WHITE);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(2.1, 0.5, 0.5)), BLACK);
    }

    #[test]
    fn test_image_texture_corners_and_flip() {
        // Top row: white, black. Bottom row: black, black.
        let data = vec![255, 255, 255, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let image = Arc::new(ImageData::from_rgb8(2, 2, data).unwrap());
        let tex = ImageTexture::new(image);

        // v = 1 is the top of the image
        assert!((tex.value(0.0, 1.0, Vec3::ZERO) - WHITE).length() < 1e-5);
        assert!((tex.value(0.0, 0.0, Vec3::ZERO) - BLACK).length() < 1e-5);
        assert!((tex.value(1.0, 1.0, Vec3::ZERO) - BLACK).length() < 1e-5);
    }

    #[test]
    fn test_image_texture_clamps_uv() {
        let data = vec![255, 255, 255, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let tex = ImageTexture::new(Arc::new(ImageData::from_rgb8(2, 2, data).unwrap()));

        assert_eq!(tex.value(-3.0, 9.0, Vec3::ZERO), tex.value(0.0, 1.0, Vec3::ZERO));
    }

    #[test]
    fn test_image_texture_bilinear_midpoint() {
        let data = vec![255, 255, 255, 0, 0, 0];
        let tex = ImageTexture::new(Arc::new(ImageData::from_rgb8(2, 1, data).unwrap()));

        let mid = tex.value(0.5, 0.5, Vec3::ZERO);
        assert!((mid.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_missing_image_is_magenta() {
        let tex = ImageTexture::open("/definitely/not/here.png");
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_noise_texture_in_unit_range() {
        let tex = NoiseTexture::new(4.0, &mut StdRng::seed_from_u64(5));

        for i in 0..100 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.05);
            let c = tex.value(0.0, 0.0, p);
            assert!((0.0..=1.0).contains(&c.x));
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
        }
    }
}
