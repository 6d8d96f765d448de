//! Closed set of renderable shapes.

use lumen_core::{Geometry, Material, Primitive};
use lumen_math::{Aabb, Ray, Vec3};

use crate::intersection::SurfaceHit;
use crate::{Sphere, Triangle};

/// A renderable shape.
///
/// Using an enum keeps dispatch static and lets the partition tree own a
/// flat `Vec<Shape>`.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Shape {
    /// Build a world-space shape from a scene primitive.
    pub fn from_primitive(primitive: &Primitive) -> Self {
        match &primitive.geometry {
            Geometry::Sphere { center, radius } => {
                Shape::Sphere(Sphere::new(*center, *radius, primitive.transform, primitive.material))
            }
            Geometry::Triangle { vertices, normals } => Shape::Triangle(Triangle::new(
                *vertices,
                *normals,
                primitive.transform,
                primitive.material,
            )),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Sphere(s) => s.bounding_box(),
            Shape::Triangle(t) => t.bounding_box(),
        }
    }

    pub fn centroid(&self) -> Vec3 {
        self.bounding_box().centroid()
    }

    pub fn material(&self) -> &Material {
        match self {
            Shape::Sphere(s) => s.material(),
            Shape::Triangle(t) => t.material(),
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        match self {
            Shape::Sphere(s) => s.intersect(ray),
            Shape::Triangle(t) => t.intersect(ray),
        }
    }

    /// Test whether the shape may touch the box. Never misses a real overlap.
    pub fn overlaps(&self, aabb: &Aabb) -> bool {
        match self {
            Shape::Sphere(s) => s.overlaps(aabb),
            Shape::Triangle(t) => t.overlaps(aabb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Color;
    use lumen_math::Mat4;

    #[test]
    fn test_from_primitive() {
        let material = Material::diffuse(Color::new(1.0, 0.0, 0.0));
        let sphere = Primitive::sphere(Vec3::ZERO, 1.0, material)
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
        let shape = Shape::from_primitive(&sphere);

        assert!(matches!(shape, Shape::Sphere(_)));
        assert_eq!(shape.material().diffuse, Color::new(1.0, 0.0, 0.0));
        assert!((shape.centroid() - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);

        let hit = shape.intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangle_primitive_in_world_space() {
        let tri = Primitive::triangle([Vec3::ZERO, Vec3::X, Vec3::Y], Material::default())
            .with_transform(Mat4::from_scale(Vec3::splat(2.0)));
        let shape = Shape::from_primitive(&tri);
        let bbox = shape.bounding_box();

        assert_eq!(bbox.max, Vec3::new(2.0, 2.0, 0.0));
        // Box straddling the z = 0 plane inside the scaled triangle
        assert!(shape.overlaps(&Aabb::from_points(Vec3::new(0.9, 0.9, -0.1), Vec3::new(1.1, 1.1, 0.1))));
        // Same box lifted off the plane
        assert!(!shape.overlaps(&Aabb::from_points(Vec3::new(0.9, 0.9, 0.1), Vec3::new(1.1, 1.1, 0.3))));
        // Beyond the hypotenuse x + y = 2
        assert!(!shape.overlaps(&Aabb::from_points(Vec3::new(1.2, 1.2, -0.1), Vec3::new(1.4, 1.4, 0.1))));
    }
}
