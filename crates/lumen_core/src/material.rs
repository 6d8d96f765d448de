//! Phong-style surface material.

use crate::Color;

/// Surface reflectance coefficients used by the Whitted shading model.
///
/// `specular` doubles as the mirror reflectance for recursive reflection rays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Lambertian reflectance
    pub diffuse: Color,
    /// Blinn-Phong highlight and mirror reflectance
    pub specular: Color,
    /// Light emitted by the surface itself
    pub emission: Color,
    /// Constant ambient term
    pub ambient: Color,
    /// Blinn-Phong exponent
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Color::BLACK,
            specular: Color::BLACK,
            emission: Color::BLACK,
            ambient: Color::splat(0.2),
            shininess: 0.0,
        }
    }
}

impl Material {
    /// Create a purely diffuse material with no ambient term.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse: color,
            ambient: Color::BLACK,
            ..Default::default()
        }
    }

    /// Check if this material reflects mirror rays.
    pub fn is_reflective(&self) -> bool {
        !self.specular.is_black()
    }
}
