//! Lumen Renderer - CPU Whitted ray tracing
//!
//! Traces camera rays through a spatial partition tree, shading hits with
//! Phong-style direct lighting, shadow rays and recursive mirror reflection.
//! Buckets of the image are rendered in parallel with rayon.

mod bucket;
mod intersection;
mod partition;
mod renderer;
mod shading;
mod shape;
mod sphere;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use intersection::{closest, Intersection, ShapeId, SurfaceHit, HIT_EPSILON};
pub use partition::{NodeId, PartitionNode, PartitionTree, SplitPolicy, TreeStats};
pub use renderer::{
    render, render_pixel, ImageBuffer, RenderConfig, RenderError, RenderOutput, RenderReport, RenderResult,
};
pub use shading::{reflect, DebugMode, Shader, ShadingConfig, TraceResult};
pub use shape::Shape;
pub use sphere::Sphere;
pub use triangle::{Triangle, PARALLEL_EPSILON};

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Ray, Vec3};
