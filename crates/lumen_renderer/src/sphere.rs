//! Sphere primitive with an arbitrary affine transform.

use lumen_core::Material;
use lumen_math::{Aabb, Mat3, Mat4, Mat4Ext, Ray, Vec3};

use crate::intersection::{SurfaceHit, HIT_EPSILON};

/// A sphere defined in local space and placed in the world by `transform`.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    transform: Mat4,
    inverse: Mat4,
    normal_matrix: Mat3,
    /// Transformed center and a radius bounding the transformed surface
    world_center: Vec3,
    world_radius: f32,
    bbox: Aabb,
    material: Material,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, transform: Mat4, material: Material) -> Self {
        let rvec = Vec3::splat(radius.max(0.0));
        let local_box = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            transform,
            inverse: transform.inverse(),
            normal_matrix: transform.normal_matrix(),
            world_center: transform.transform_point3(center),
            world_radius: radius.max(0.0) * transform.max_stretch(),
            bbox: transform.transform_aabb(&local_box),
            material,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Intersect a world-space ray with the sphere.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        if ray.is_degenerate() || self.radius.is_nan() || self.radius <= 0.0 {
            return None;
        }

        // Solve in local space, where the sphere is round
        let origin = self.inverse.transform_point3(ray.origin);
        let direction = self.inverse.transform_vector3(ray.direction).normalize_or_zero();
        if direction == Vec3::ZERO || !origin.is_finite() {
            return None;
        }

        let oc = origin - self.center;
        let a = direction.dot(direction);
        let b = 2.0 * direction.dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let near = (-b - sqrtd) / (2.0 * a);
        let far = (-b + sqrtd) / (2.0 * a);

        // Rays starting inside the sphere hit the far wall
        let t = if near > HIT_EPSILON {
            near
        } else if far > HIT_EPSILON {
            far
        } else {
            return None;
        };

        let local_point = origin + t * direction;
        let point = self.transform.transform_point3(local_point);
        let normal = (self.normal_matrix * (local_point - self.center)).normalize_or_zero();

        Some(SurfaceHit {
            distance: point.distance(ray.origin),
            point,
            normal,
        })
    }

    /// Conservative sphere-box overlap test used while building the partition.
    ///
    /// The transformed surface lies inside the ball of `world_radius` around
    /// the transformed center, so that ball is tested against the box.
    pub fn overlaps(&self, aabb: &Aabb) -> bool {
        if !self.bbox.overlaps(aabb) {
            return false;
        }

        let closest = self.world_center.clamp(aabb.min, aabb.max);
        closest.distance_squared(self.world_center) <= self.world_radius * self.world_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere(center: Vec3) -> Sphere {
        Sphere::new(center, 1.0, Mat4::IDENTITY, Material::default())
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_hit_distance_from_offset_origin() {
        // A ray from c + (r + e) u towards c hits at distance e
        let center = Vec3::new(1.0, -2.0, 3.0);
        let sphere = Sphere::new(center, 2.0, Mat4::IDENTITY, Material::default());

        for u in [Vec3::X, Vec3::NEG_Y, Vec3::new(1.0, 1.0, 1.0).normalize()] {
            let e = 0.75;
            let ray = Ray::new(center + (2.0 + e) * u, -u);
            let hit = sphere.intersect(&ray).unwrap();
            assert!((hit.distance - e).abs() < 1e-3, "distance {} for {:?}", hit.distance, u);
        }
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere(Vec3::new(0.0, 0.0, -5.0));

        // Passes at perpendicular distance 1.5 > r
        let ray = Ray::new(Vec3::new(1.5, 0.0, 0.0), Vec3::NEG_Z);
        assert!(sphere.intersect(&ray).is_none());

        // Pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_ray_from_inside_hits_far_wall() {
        let sphere = unit_sphere(Vec3::ZERO);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_non_uniform_scale_reports_world_distance() {
        // Ellipsoid with x semi-axis 3, centered at (0, 0, -10)
        let transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0))
            * Mat4::from_scale(Vec3::new(3.0, 1.0, 1.0));
        let sphere = Sphere::new(Vec3::ZERO, 1.0, transform, Material::default());

        let ray = Ray::new(Vec3::new(10.0, 0.0, -10.0), Vec3::NEG_X);
        let hit = sphere.intersect(&ray).unwrap();

        assert!((hit.distance - 7.0).abs() < 1e-3);
        assert!((hit.point - Vec3::new(3.0, 0.0, -10.0)).length() < 1e-3);
        assert!((hit.normal - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_degenerate_sphere_never_hits() {
        let sphere = Sphere::new(Vec3::ZERO, 0.0, Mat4::IDENTITY, Material::default());
        assert!(sphere.intersect(&Ray::new(Vec3::Z * 5.0, Vec3::NEG_Z)).is_none());

        let sphere = unit_sphere(Vec3::ZERO);
        assert!(sphere.intersect(&Ray::new(Vec3::Z * 5.0, Vec3::ZERO)).is_none());
    }

    #[test]
    fn test_overlaps() {
        let sphere = unit_sphere(Vec3::ZERO);

        assert!(sphere.overlaps(&Aabb::from_points(Vec3::splat(0.5), Vec3::splat(2.0))));
        // Box corner region near (0.8, 0.8, 0.8) is outside the ball
        assert!(!sphere.overlaps(&Aabb::from_points(Vec3::splat(0.8), Vec3::splat(2.0))));
        assert!(!sphere.overlaps(&Aabb::from_points(Vec3::splat(3.0), Vec3::splat(4.0))));
    }

    #[test]
    fn test_transformed_bounding_box() {
        let transform = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let sphere = Sphere::new(Vec3::ZERO, 1.0, transform, Material::default());
        let bbox = sphere.bounding_box();

        assert!((bbox.min - Vec3::new(3.0, -2.0, -2.0)).length() < 1e-4);
        assert!((bbox.max - Vec3::new(7.0, 2.0, 2.0)).length() < 1e-4);
    }
}
