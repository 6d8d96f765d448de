//! Pinhole camera for primary ray generation.

use lumen_math::{Ray, Vec3};

/// A look-at pinhole camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    look_from: Vec3,
    look_at: Vec3,
    up: Vec3,
    /// Vertical field of view in degrees
    fovy: f32,

    // Orthonormal basis, w points away from the view direction
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a camera at `look_from` aimed at `look_at`.
    pub fn new(look_from: Vec3, look_at: Vec3, up: Vec3, fovy: f32) -> Self {
        let w = (look_from - look_at).normalize_or_zero();
        let u = up.cross(w).normalize_or_zero();
        let v = w.cross(u);

        Self {
            look_from,
            look_at,
            up,
            fovy,
            u,
            v,
            w,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.look_from
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    /// Returns false when eye, target and up do not span a basis.
    pub fn is_valid(&self) -> bool {
        self.u != Vec3::ZERO && self.w != Vec3::ZERO && self.fovy > 0.0 && self.fovy < 180.0
    }

    /// Ray through continuous image coordinates `(x, y)`.
    ///
    /// `(0, 0)` is the top-left corner of the image and `y` grows downward;
    /// pass `x + 0.5, y + 0.5` for pixel centers.
    pub fn ray_for_pixel(&self, x: f32, y: f32, width: u32, height: u32) -> Ray {
        let half_w = width as f32 / 2.0;
        let half_h = height as f32 / 2.0;
        let tan_half = (self.fovy.to_radians() / 2.0).tan();
        let aspect = width as f32 / height as f32;

        let alpha = tan_half * aspect * ((x - half_w) / half_w);
        let beta = tan_half * ((half_h - y) / half_h);

        Ray::new(self.look_from, alpha * self.u + beta * self.v - self.w)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 90.0)
    }
}
