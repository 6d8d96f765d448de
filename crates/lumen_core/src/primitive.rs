//! Scene-description primitives, as read from a scene file.

use lumen_math::{Mat4, Vec3};

use crate::Material;

/// Local-space geometry of a primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    Triangle {
        vertices: [Vec3; 3],
        /// Per-vertex normals; `None` means flat shading
        normals: Option<[Vec3; 3]>,
    },
}

/// A piece of geometry with its object-to-world transform and material.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub geometry: Geometry,
    pub transform: Mat4,
    pub material: Material,
}

impl Primitive {
    pub fn sphere(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            geometry: Geometry::Sphere { center, radius },
            transform: Mat4::IDENTITY,
            material,
        }
    }

    pub fn triangle(vertices: [Vec3; 3], material: Material) -> Self {
        Self {
            geometry: Geometry::Triangle {
                vertices,
                normals: None,
            },
            transform: Mat4::IDENTITY,
            material,
        }
    }

    pub fn triangle_with_normals(vertices: [Vec3; 3], normals: [Vec3; 3], material: Material) -> Self {
        Self {
            geometry: Geometry::Triangle {
                vertices,
                normals: Some(normals),
            },
            transform: Mat4::IDENTITY,
            material,
        }
    }

    /// Set the object-to-world transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn is_sphere(&self) -> bool {
        matches!(self.geometry, Geometry::Sphere { .. })
    }

    /// Check the geometric invariants: positive finite radius, non-collinear
    /// vertices and an invertible transform.
    pub fn is_valid(&self) -> bool {
        let transform_ok = self.transform.is_finite() && self.transform.determinant().abs() > 1e-12;

        let geometry_ok = match &self.geometry {
            Geometry::Sphere { center, radius } => center.is_finite() && radius.is_finite() && *radius > 0.0,
            Geometry::Triangle { vertices, .. } => !is_degenerate_triangle(vertices),
        };

        transform_ok && geometry_ok
    }
}

/// Returns true if the three points are (nearly) collinear or non-finite.
pub fn is_degenerate_triangle(vertices: &[Vec3; 3]) -> bool {
    let [a, b, c] = *vertices;
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return true;
    }

    let e1 = b - a;
    let e2 = c - a;
    let scale = e1.length_squared() * e2.length_squared();
    e1.cross(e2).length_squared() <= 1e-12 * scale || scale == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_validity() {
        let ok = Primitive::sphere(Vec3::ZERO, 1.0, Material::default());
        assert!(ok.is_valid());
        assert!(ok.is_sphere());

        let flat = Primitive::sphere(Vec3::ZERO, 0.0, Material::default());
        assert!(!flat.is_valid());

        let squashed = ok.clone().with_transform(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        assert!(!squashed.is_valid());
    }

    #[test]
    fn test_degenerate_triangle() {
        let collinear = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert!(is_degenerate_triangle(&collinear));

        let repeated = [Vec3::ZERO, Vec3::ZERO, Vec3::Y];
        assert!(is_degenerate_triangle(&repeated));

        let tiny = [Vec3::ZERO, Vec3::X * 1e-3, Vec3::Y * 1e-3];
        assert!(!is_degenerate_triangle(&tiny));
    }
}
