//! Triangle primitive.
//!
//! Vertices and normals are moved into world space once at construction, so
//! intersection works directly on world-space rays.

use lumen_core::Material;
use lumen_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};

use crate::intersection::{SurfaceHit, HIT_EPSILON};

/// Relative tolerance for rejecting rays parallel to the triangle plane.
pub const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle with optional per-vertex shading normals.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// World-space vertices
    vertices: [Vec3; 3],
    /// World-space unit shading normals
    normals: [Vec3; 3],
    /// Unnormalized geometric normal `(v1 - v0) x (v2 - v0)`
    plane_normal: Vec3,
    bbox: Aabb,
    material: Material,
}

impl Triangle {
    /// Create a triangle from local-space vertices placed by `transform`.
    ///
    /// Without vertex normals the triangle is flat shaded.
    pub fn new(vertices: [Vec3; 3], normals: Option<[Vec3; 3]>, transform: Mat4, material: Material) -> Self {
        let vertices = vertices.map(|v| transform.transform_point3(v));
        let [v0, v1, v2] = vertices;
        let plane_normal = (v1 - v0).cross(v2 - v0);
        let flat = plane_normal.normalize_or_zero();

        let normals = match normals {
            Some(normals) => normals.map(|n| {
                let n = transform.transform_normal(n);
                if n == Vec3::ZERO {
                    flat
                } else {
                    n
                }
            }),
            None => [flat; 3],
        };

        let bbox = Aabb::new(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            vertices,
            normals,
            plane_normal,
            bbox,
            material,
        }
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3; 3] {
        &self.normals
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Ray-plane intersection followed by an inclusive inside-outside test.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        if ray.is_degenerate() {
            return None;
        }

        let n = self.plane_normal;
        let [v0, v1, v2] = self.vertices;

        let denom = ray.direction.dot(n);
        // Also rejects degenerate triangles, whose normal is zero
        if denom.abs() <= PARALLEL_EPSILON * n.length() * ray.direction.length() {
            return None;
        }

        let t = n.dot(v0 - ray.origin) / denom;
        if !(t >= HIT_EPSILON) || !t.is_finite() {
            return None;
        }

        let p = ray.origin + t * ray.direction;

        // Signed double areas of the sub-triangles opposite each vertex
        let w0 = (v1 - v0).cross(p - v0).dot(n);
        let w1 = (v2 - v1).cross(p - v1).dot(n);
        let w2 = (v0 - v2).cross(p - v2).dot(n);
        if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
            return None;
        }

        let area = n.length_squared();
        let (b0, b1, b2) = (w1 / area, w2 / area, w0 / area);
        let shading = b0 * self.normals[0] + b1 * self.normals[1] + b2 * self.normals[2];
        let normal = if shading == Vec3::ZERO {
            n.normalize_or_zero()
        } else {
            shading.normalize()
        };

        Some(SurfaceHit {
            distance: p.distance(ray.origin),
            point: p,
            normal,
        })
    }

    /// Exact triangle-box overlap via the Separating Axis Theorem.
    ///
    /// Tests the three box face normals, the triangle normal and the nine
    /// edge cross products; zero-length axes are skipped.
    pub fn overlaps(&self, aabb: &Aabb) -> bool {
        if !self.bbox.overlaps(aabb) {
            return false;
        }

        let center = aabb.centroid();
        let half = (aabb.max - aabb.min) * 0.5;
        let verts = self.vertices.map(|v| v - center);
        let edges = [verts[1] - verts[0], verts[2] - verts[1], verts[0] - verts[2]];

        let mut axes = Vec::with_capacity(13);
        axes.extend([Vec3::X, Vec3::Y, Vec3::Z]);
        axes.push(self.plane_normal);
        for box_axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            for edge in edges {
                axes.push(box_axis.cross(edge));
            }
        }

        axes.into_iter()
            .filter(|axis| axis.length_squared() > 1e-12)
            .all(|axis| {
                let projected = Interval::enclosing(verts.iter().map(|v| v.dot(axis)));
                let radius = half.dot(axis.abs());
                projected.overlaps(&Interval::new(-radius, radius))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            Mat4::IDENTITY,
            Material::default(),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z);

        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.8, 0.8, 1.0), Vec3::NEG_Z);
        assert!(tri.intersect(&ray).is_none());

        // Behind the origin
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(-1.0, 0.25, 0.0), Vec3::X);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_edges_are_inclusive() {
        let tri = unit_triangle();

        // On the hypotenuse and on a vertex
        for p in [Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)] {
            let ray = Ray::new(p + Vec3::Z, Vec3::NEG_Z);
            assert!(tri.intersect(&ray).is_some(), "edge point {:?} should hit", p);
        }
    }

    #[test]
    fn test_back_face_hit() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::Z);
        let hit = tri.intersect(&ray).unwrap();

        // Outward normal is reported; facing is resolved by Intersection
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_interpolated_normals() {
        let n = Vec3::new(1.0, 0.0, 1.0).normalize();
        let tri = Triangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            Some([Vec3::Z, n, Vec3::Z]),
            Mat4::IDENTITY,
            Material::default(),
        );

        // At vertex 1 the shading normal equals its vertex normal
        let hit = tri.intersect(&Ray::new(Vec3::new(1.0, 0.0, 1.0), Vec3::NEG_Z)).unwrap();
        assert!((hit.normal - n).length() < 1e-4);

        // At vertex 0 it is +Z
        let hit = tri.intersect(&Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z)).unwrap();
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_transformed_triangle() {
        let tri = Triangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)),
            Material::default(),
        );
        let hit = tri.intersect(&Ray::new(Vec3::new(0.2, 0.2, 0.0), Vec3::NEG_Z)).unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let tri = Triangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            None,
            Mat4::IDENTITY,
            Material::default(),
        );
        assert!(tri.intersect(&Ray::new(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z)).is_none());
    }

    #[test]
    fn test_sat_overlap() {
        let tri = unit_triangle();

        assert!(tri.overlaps(&Aabb::from_points(Vec3::splat(-0.1), Vec3::splat(0.1))));
        // Inside the triangle's bounding box but beyond the hypotenuse
        assert!(!tri.overlaps(&Aabb::from_points(Vec3::new(0.7, 0.7, -0.1), Vec3::new(1.0, 1.0, 0.1))));
        // Above the plane
        assert!(!tri.overlaps(&Aabb::from_points(Vec3::new(0.1, 0.1, 0.5), Vec3::new(0.3, 0.3, 0.8))));
        // Box containing the whole triangle
        assert!(tri.overlaps(&Aabb::from_points(Vec3::splat(-5.0), Vec3::splat(5.0))));
    }
}
