//! Lumen Core - Scene description for the Lumen ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `SceneSettings`, `Primitive`, `Material`, `Light`, `Camera`
//! - **Scene loading**: the line-oriented scene command format
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::load_scene;
//!
//! let scene = load_scene("scene.test")?;
//! println!("Loaded {} spheres, {} triangles",
//!     scene.sphere_count(),
//!     scene.triangle_count());
//! ```

pub mod camera;
pub mod color;
pub mod light;
pub mod loader;
pub mod material;
pub mod primitive;
pub mod scene;

// Re-export commonly used types
pub use camera::Camera;
pub use color::Color;
pub use light::{Light, LightKind, LightSample};
pub use loader::{load_scene, load_scene_from_string, LoadError, LoadResult};
pub use material::Material;
pub use primitive::{Geometry, Primitive};
pub use scene::{Scene, SceneBuilder, SceneSettings, MAX_PIXELS};
