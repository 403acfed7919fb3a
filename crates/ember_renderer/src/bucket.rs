//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon. Each bucket draws from its
//! own generator seeded from the render seed and the bucket index, so the
//! image for a given seed does not depend on the thread count.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::renderer::render_pixel;
use crate::{Camera, Color, Hittable, ImageBuffer, RenderConfig, RenderError, RenderResult};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets are rendered from the center outward so the most important
/// part of the frame finishes first.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    // Stable sort keeps ties in grid order, so the order is reproducible
    buckets.sort_by(|a, b| {
        let a_center_x = a.x as f32 + a.width as f32 / 2.0;
        let a_center_y = a.y as f32 + a.height as f32 / 2.0;
        let b_center_x = b.x as f32 + b.width as f32 / 2.0;
        let b_center_y = b.y as f32 + b.height as f32 / 2.0;

        let a_dist = (a_center_x - center_x).powi(2) + (a_center_y - center_y).powi(2);
        let b_dist = (b_center_x - center_x).powi(2) + (b_center_y - center_y).powi(2);

        a_dist.partial_cmp(&b_dist).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Cooperative cancellation flag shared between a render and its owner.
///
/// Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the render to stop at the next bucket row.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Seed for a bucket's private generator.
fn bucket_seed(seed: u64, index: usize) -> u64 {
    // Spread consecutive indices across the seed space
    seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket, or `None` if
/// `cancel` was raised before the bucket finished.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    seed: u64,
    cancel: &CancelToken,
) -> Option<Vec<Color>> {
    let mut rng = StdRng::seed_from_u64(bucket_seed(seed, bucket.index));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        if cancel.is_cancelled() {
            return None;
        }
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let color = render_pixel(camera, world, global_x, global_y, config, &mut rng);
            pixels.push(color);
        }
    }

    Some(pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy this bucket's pixels into their place in `image`.
    pub fn write_to(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (row, chunk) in self.pixels.chunks(width.max(1)).enumerate() {
            for (col, color) in chunk.iter().enumerate() {
                image.set(self.bucket.x + col as u32, self.bucket.y + row as u32, *color);
            }
        }
    }
}

/// Options for [`render_parallel`].
#[derive(Debug, Clone)]
pub struct ParallelOptions {
    /// Worker threads; 0 uses rayon's global pool
    pub threads: usize,
    pub bucket_size: u32,
    pub seed: u64,
    pub cancel: CancelToken,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
            cancel: CancelToken::new(),
        }
    }
}

/// Render the whole image with buckets spread over a rayon pool.
///
/// Fails with [`RenderError::InvalidConfig`] before any work starts, or with
/// [`RenderError::Cancelled`] if the token is raised mid-render.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    options: &ParallelOptions,
) -> RenderResult<ImageBuffer> {
    config.validate()?;
    if camera.image_width == 0 || camera.image_height == 0 {
        return Err(RenderError::InvalidConfig(format!(
            "image size must be non-zero, got {}x{}",
            camera.image_width, camera.image_height
        )));
    }

    let buckets = generate_buckets(camera.image_width, camera.image_height, options.bucket_size);
    let total = buckets.len();
    let completed = AtomicUsize::new(0);
    let start = Instant::now();

    log::info!(
        "Rendering {}x{} in {} buckets ({} spp, depth {})",
        camera.image_width,
        camera.image_height,
        total,
        config.samples_per_pixel,
        config.max_depth
    );

    let render_all = || {
        buckets
            .par_iter()
            .map(|bucket| {
                if options.cancel.is_cancelled() {
                    return None;
                }
                let pixels =
                    render_bucket(bucket, camera, world, config, options.seed, &options.cancel)?;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("Bucket {} done ({}/{})", bucket.index, done, total);

                Some(BucketResult::new(*bucket, pixels))
            })
            .collect::<Option<Vec<_>>>()
    };

    let results = if options.threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
        {
            Ok(pool) => pool.install(render_all),
            Err(e) => {
                log::warn!(
                    "Failed to build {}-thread pool ({e}); using global pool",
                    options.threads
                );
                render_all()
            }
        }
    } else {
        render_all()
    };

    let Some(results) = results else {
        log::warn!("Render cancelled after {:.2?}", start.elapsed());
        return Err(RenderError::Cancelled);
    };

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        result.write_to(&mut image);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, Lambertian, Sphere, Vec3};

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);
    }

    #[test]
    fn test_bucket_seeds_differ() {
        assert_ne!(bucket_seed(7, 0), bucket_seed(7, 1));
        assert_ne!(bucket_seed(7, 0), bucket_seed(8, 0));
    }

    fn scene() -> (Camera, HittableList, RenderConfig) {
        let mut world = HittableList::new();
        world.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Lambertian::new(Color::splat(0.5))));

        let mut camera = Camera::new()
            .with_resolution(20, 12)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();

        let config = RenderConfig {
            samples_per_pixel: 2,
            max_depth: 4,
            background: Color::new(0.7, 0.8, 1.0),
        };
        (camera, world, config)
    }

    #[test]
    fn test_parallel_render_independent_of_thread_count() {
        let (camera, world, config) = scene();
        let options = |threads| ParallelOptions {
            threads,
            bucket_size: 8,
            seed: 99,
            cancel: CancelToken::new(),
        };

        let one = render_parallel(&camera, &world, &config, &options(1)).unwrap();
        let four = render_parallel(&camera, &world, &config, &options(4)).unwrap();

        assert_eq!(one, four);
        assert_eq!(one.pixels.len(), 20 * 12);
    }

    #[test]
    fn test_parallel_render_seed_changes_image() {
        let (camera, world, config) = scene();
        let with_seed = |seed| ParallelOptions {
            seed,
            bucket_size: 8,
            ..ParallelOptions::default()
        };

        let a = render_parallel(&camera, &world, &config, &with_seed(1)).unwrap();
        let b = render_parallel(&camera, &world, &config, &with_seed(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cancelled_render_returns_error() {
        let (camera, world, config) = scene();
        let options = ParallelOptions::default();
        options.cancel.cancel();

        let result = render_parallel(&camera, &world, &config, &options);
        assert_eq!(result, Err(RenderError::Cancelled));
    }

    #[test]
    fn test_parallel_render_rejects_zero_samples() {
        let (camera, world, mut config) = scene();
        config.samples_per_pixel = 0;

        let result = render_parallel(&camera, &world, &config, &ParallelOptions::default());
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_bucket_result_write_to() {
        let bucket = Bucket::new(1, 1, 2, 1, 0);
        let result = BucketResult::new(bucket, vec![Color::X, Color::Y]);
        let mut image = ImageBuffer::new(4, 3);

        result.write_to(&mut image);
        assert_eq!(image.get(1, 1), Color::X);
        assert_eq!(image.get(2, 1), Color::Y);
        assert_eq!(image.get(0, 0), Color::ZERO);
    }
}
