//! Image rendering: configuration, output buffer and the parallel render loop.

use std::path::Path;
use std::time::{Duration, Instant};

use lumen_core::{Camera, Color, Scene};
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::shading::{Shader, ShadingConfig, TraceResult};
use crate::PartitionTree;

/// Errors that can occur while rendering or writing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Pixel buffer does not match image size {width}x{height}")]
    BufferSize { width: u32, height: u32 },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub shading: ShadingConfig,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Jitter camera rays inside each pixel instead of using the center
    pub jitter: bool,
    /// Base seed for jitter
    pub seed: u64,
    /// Stop after this many rows; the rest keep the background color
    pub scanline_limit: Option<u32>,
    /// Size of a dedicated thread pool; `None` uses the global pool
    pub threads: Option<usize>,
    /// Use the partition tree for visibility (brute force otherwise)
    pub use_partition: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shading: ShadingConfig::default(),
            bucket_size: DEFAULT_BUCKET_SIZE,
            jitter: false,
            seed: 0,
            scanline_limit: None,
            threads: None,
            use_partition: true,
        }
    }
}

impl RenderConfig {
    pub fn with_shading(mut self, shading: ShadingConfig) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_scanline_limit(mut self, rows: u32) -> Self {
        self.scanline_limit = Some(rows);
        self
    }

    pub fn with_jitter(mut self, seed: u64) -> Self {
        self.jitter = true;
        self.seed = seed;
        self
    }
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; (width as usize) * (height as usize)],
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Get the pixel at (x, y), `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y); writes outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let x = bucket.x + i as u32 % bucket.width;
            let y = bucket.y + i as u32 / bucket.width;
            self.set(x, y, *color);
        }
    }

    /// Convert to packed 8-bit RGB, clamping each channel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgb8()).collect()
    }

    /// Write the image; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let image = image::RgbImage::from_raw(self.width, self.height, self.to_rgb8()).ok_or(
            RenderError::BufferSize {
                width: self.width,
                height: self.height,
            },
        )?;
        image.save(path)?;
        Ok(())
    }
}

/// What happened during a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    /// Rows actually traced
    pub rows_rendered: u32,
    pub buckets: usize,
    pub shapes: usize,
    pub lights: usize,
    /// Deepest nested trace reached by any pixel
    pub max_trace_depth: u32,
    pub elapsed: Duration,
}

impl RenderReport {
    /// True when a scanline limit stopped the render early.
    pub fn is_partial(&self) -> bool {
        self.rows_rendered < self.height
    }
}

/// Rendered image and its report.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: ImageBuffer,
    pub report: RenderReport,
}

/// Render a single pixel.
///
/// Uses the pixel center, or a uniformly jittered position inside the pixel
/// when `rng` is given.
pub fn render_pixel(
    shader: &Shader,
    camera: &Camera,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    rng: Option<&mut StdRng>,
) -> TraceResult {
    let (dx, dy) = match rng {
        Some(rng) => (rng.gen::<f32>(), rng.gen::<f32>()),
        None => (0.5, 0.5),
    };
    let ray = camera.ray_for_pixel(x as f32 + dx, y as f32 + dy, width, height);
    shader.trace(&ray)
}

/// Render the scene into a new image.
///
/// Buckets are traced in parallel and written into the image once all of
/// them are done.
pub fn render(scene: &Scene, tree: &PartitionTree, config: &RenderConfig) -> RenderResult<RenderOutput> {
    match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            Ok(pool.install(|| render_buckets(scene, tree, config)))
        }
        None => Ok(render_buckets(scene, tree, config)),
    }
}

fn render_buckets(scene: &Scene, tree: &PartitionTree, config: &RenderConfig) -> RenderOutput {
    let start = Instant::now();
    let width = scene.width();
    let height = scene.height();
    let rows = config.scanline_limit.map_or(height, |limit| limit.min(height));

    let shader = Shader::new(tree, scene, &config.shading).with_partition(config.use_partition);
    let buckets = generate_buckets(width, rows, config.bucket_size);

    log::info!(
        "Rendering {}x{} ({} rows) in {} buckets on {} threads",
        width,
        height,
        rows,
        buckets.len(),
        rayon::current_num_threads()
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, &shader, scene.camera(), width, height, config))
        .collect();

    let mut image = ImageBuffer::new(width, height, scene.settings().background);
    for result in &results {
        image.write_bucket(result);
    }

    let report = RenderReport {
        width,
        height,
        rows_rendered: rows,
        buckets: results.len(),
        shapes: tree.shapes().len(),
        lights: scene.light_count(),
        max_trace_depth: results.iter().map(|r| r.max_depth).max().unwrap_or(0),
        elapsed: start.elapsed(),
    };

    if report.is_partial() {
        log::warn!("Partial render: {} of {} rows", rows, height);
    }
    log::info!("Render finished in {:.2?}", report.elapsed);

    RenderOutput { image, report }
}
