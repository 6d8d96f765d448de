//! Image tiles.
//!
//! The rendered rows are cut into square buckets that share nothing but the
//! shader, so rayon can trace them on any worker.

use lumen_core::{Camera, Color};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::renderer::{render_pixel, RenderConfig};
use crate::Shader;

/// Tile of pixels traced as one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Top-left pixel
    pub x: u32,
    pub y: u32,
    /// Size in pixels; edge buckets may be smaller than requested
    pub width: u32,
    pub height: u32,
    /// Position in row-major order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Seed for this bucket's jitter generator, stable for a given base seed.
    pub fn seed(&self, base: u64) -> u64 {
        base ^ (self.index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Bucket edge length used when none is configured.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets covering the top `height` rows of an image, in
/// row-major order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

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

    buckets
}

/// Traced pixels of one bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Row-major within the bucket
    pub pixels: Vec<Color>,
    /// Deepest trace recursion reached by any pixel
    pub max_depth: u32,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>, max_depth: u32) -> Self {
        Self { bucket, pixels, max_depth }
    }
}

/// Render a single bucket.
///
/// Returns pixels in row-major order within the bucket. `image_width` and
/// `image_height` are the full image dimensions used for camera rays.
pub fn render_bucket(
    bucket: &Bucket,
    shader: &Shader,
    camera: &Camera,
    image_width: u32,
    image_height: u32,
    config: &RenderConfig,
) -> BucketResult {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    let mut max_depth = 0;
    let mut rng = config.jitter.then(|| StdRng::seed_from_u64(bucket.seed(config.seed)));

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let result = render_pixel(
                shader,
                camera,
                global_x,
                global_y,
                image_width,
                image_height,
                rng.as_mut(),
            );
            max_depth = max_depth.max(result.depth);
            pixels.push(result.color);
        }
    }

    log::trace!("Bucket {} done ({}x{} at {},{})", bucket.index, bucket.width, bucket.height, bucket.x, bucket.y);

    BucketResult::new(*bucket, pixels, max_depth)
}
