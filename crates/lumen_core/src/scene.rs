//! Validated, immutable scene description.
//!
//! A [`Scene`] is only produced by [`SceneBuilder::build`], so everything
//! downstream can assume positive radii, non-degenerate triangles, a usable
//! camera and sane attenuation coefficients.

use std::path::PathBuf;

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::loader::{LoadError, LoadResult};
use crate::{Camera, Color, Geometry, Light, Primitive};

/// Largest image a scene may request, in pixels (8192 x 8192).
pub const MAX_PIXELS: u64 = 1 << 26;

/// Global render settings read from the scene file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Point light attenuation coefficients `(constant, linear, quadratic)`
    pub attenuation: Vec3,
    /// Maximum number of nested trace calls per camera ray
    pub max_depth: u32,
    /// Color returned by camera rays that hit nothing
    pub background: Color,
    /// Where the rendered image is written
    pub output: PathBuf,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            attenuation: Vec3::new(1.0, 0.0, 0.0),
            max_depth: 5,
            background: Color::BLACK,
            output: PathBuf::from("test.png"),
        }
    }
}

impl SceneSettings {
    /// Attenuation must be non-negative and not identically zero.
    pub fn attenuation_is_valid(&self) -> bool {
        let a = self.attenuation;
        a.is_finite() && a.min_element() >= 0.0 && a.max_element() > 0.0
    }
}

/// A complete scene ready for rendering.
#[derive(Clone, Debug)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    camera: Camera,
    settings: SceneSettings,
}

impl Scene {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn width(&self) -> u32 {
        self.settings.width
    }

    pub fn height(&self) -> u32 {
        self.settings.height
    }

    pub fn sphere_count(&self) -> usize {
        self.primitives.iter().filter(|p| p.is_sphere()).count()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p.geometry, Geometry::Triangle { .. }))
            .count()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Replace the output path, e.g. from a command-line override.
    pub fn set_output(&mut self, output: PathBuf) {
        self.settings.output = output;
    }
}

/// Accumulates scene contents and validates them into a [`Scene`].
#[derive(Clone, Debug, Default)]
pub struct SceneBuilder {
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    camera: Option<Camera>,
    size: Option<(u32, u32)>,
    settings: SceneSettings,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&mut self, width: u32, height: u32) -> &mut Self {
        self.size = Some((width, height));
        self
    }

    pub fn camera(&mut self, camera: Camera) -> &mut Self {
        self.camera = Some(camera);
        self
    }

    pub fn light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    pub fn primitive(&mut self, primitive: Primitive) -> &mut Self {
        self.primitives.push(primitive);
        self
    }

    pub fn attenuation(&mut self, coefficients: Vec3) -> &mut Self {
        self.settings.attenuation = coefficients;
        self
    }

    pub fn max_depth(&mut self, depth: u32) -> &mut Self {
        self.settings.max_depth = depth;
        self
    }

    pub fn background(&mut self, color: Color) -> &mut Self {
        self.settings.background = color;
        self
    }

    pub fn output(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.settings.output = path.into();
        self
    }

    /// Validate and produce the scene.
    pub fn build(self) -> LoadResult<Scene> {
        let (width, height) = self.size.ok_or(LoadError::MissingCommand("size"))?;
        if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(LoadError::InvalidSize { width, height });
        }

        let camera = self.camera.ok_or(LoadError::MissingCommand("camera"))?;
        if !camera.is_valid() {
            return Err(LoadError::InvalidCamera);
        }

        if !self.settings.attenuation_is_valid() {
            return Err(LoadError::InvalidAttenuation(self.settings.attenuation));
        }

        if let Some(index) = self.primitives.iter().position(|p| !p.is_valid()) {
            return Err(LoadError::InvalidPrimitive(index));
        }

        let settings = SceneSettings {
            width,
            height,
            ..self.settings
        };

        log::debug!(
            "Built scene: {}x{}, {} primitives, {} lights",
            width,
            height,
            self.primitives.len(),
            self.lights.len()
        );

        Ok(Scene {
            primitives: self.primitives,
            lights: self.lights,
            camera,
            settings,
        })
    }
}
