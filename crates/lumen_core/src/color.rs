//! Linear RGB color.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// An RGB color with float channels, nominally in [0, 1].
///
/// Channels are not clamped during shading; clamping happens once at the image
/// boundary through [`Color::to_rgb8`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// A grey with every channel set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Returns true if every channel is exactly zero.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Red channel as a byte, `r * 255` clamped into [0, 255].
    pub fn r8(&self) -> u8 {
        channel_to_byte(self.r)
    }

    /// Green channel as a byte, `g * 255` clamped into [0, 255].
    pub fn g8(&self) -> u8 {
        channel_to_byte(self.g)
    }

    /// Blue channel as a byte, `b * 255` clamped into [0, 255].
    pub fn b8(&self) -> u8 {
        channel_to_byte(self.b)
    }

    /// Convert to 8-bit RGB.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [self.r8(), self.g8(), self.b8()]
    }
}

#[inline]
fn channel_to_byte(c: f32) -> u8 {
    // NaN maps to 0 through the saturating cast
    (c * 255.0).clamp(0.0, 255.0) as u8
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

/// Component-wise product.
impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Mul<Color> for f32 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        rhs * self
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Color {
        iter.fold(Color::BLACK, Add::add)
    }
}
