//! Point and directional lights.

use lumen_math::{Vec3, Vec4};

use crate::Color;

/// Where a light sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Positional light, attenuated with distance.
    Point { position: Vec3 },
    /// Light at infinity; `direction` points from the scene towards the light.
    Directional { direction: Vec3 },
}

/// A light source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
}

/// Direction and distance from a surface point to a light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSample {
    /// Unit vector from the surface point towards the light
    pub direction: Vec3,
    /// Distance to the light, infinite for directional lights
    pub distance: f32,
}

impl Light {
    pub fn point(position: Vec3, color: Color) -> Self {
        Self {
            kind: LightKind::Point { position },
            color,
        }
    }

    pub fn directional(direction: Vec3, color: Color) -> Self {
        Self {
            kind: LightKind::Directional {
                direction: direction.normalize_or_zero(),
            },
            color,
        }
    }

    /// Build a light from a homogeneous location: `w > 0` is a point light at
    /// `xyz / w`, `w == 0` a directional light along `xyz`.
    pub fn from_homogeneous(location: Vec4, color: Color) -> Self {
        if location.w > 0.0 {
            Self::point(location.truncate() / location.w, color)
        } else {
            Self::directional(location.truncate(), color)
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, LightKind::Point { .. })
    }

    /// Direction and distance from `p` to this light.
    pub fn sample(&self, p: Vec3) -> LightSample {
        match self.kind {
            LightKind::Point { position } => {
                let to_light = position - p;
                LightSample {
                    direction: to_light.normalize_or_zero(),
                    distance: to_light.length(),
                }
            }
            LightKind::Directional { direction } => LightSample {
                direction,
                distance: f32::INFINITY,
            },
        }
    }

    /// Distance attenuation `1 / (c0 + c1 d + c2 d^2)`.
    ///
    /// Directional lights are never attenuated. `coefficients` is `(c0, c1, c2)`.
    pub fn attenuation(&self, distance: f32, coefficients: Vec3) -> f32 {
        match self.kind {
            LightKind::Point { .. } => {
                let denom = coefficients.x
                    + coefficients.y * distance
                    + coefficients.z * distance * distance;
                if denom > 0.0 {
                    1.0 / denom
                } else {
                    0.0
                }
            }
            LightKind::Directional { .. } => 1.0,
        }
    }
}
