//! Ray-surface intersection records.

use lumen_core::Material;
use lumen_math::{Ray, Vec3};

/// Minimum accepted hit distance along a ray, guards against self-intersection.
pub const HIT_EPSILON: f32 = 1e-4;

/// Index of a shape in the partition tree's shape list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub usize);

/// Geometric result of intersecting a single shape, before it is tied to a
/// shape id and material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// World-space distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Unit outward surface normal
    pub normal: Vec3,
}

/// Record of the nearest intersection of a ray with the scene.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub distance: f32,
    pub point: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    pub material: &'a Material,
    pub shape: ShapeId,
}

impl<'a> Intersection<'a> {
    pub fn new(ray: &Ray, hit: SurfaceHit, material: &'a Material, shape: ShapeId) -> Self {
        // Flip normals hit from inside so they face the incoming ray
        let normal = if ray.direction.dot(hit.normal) <= 0.0 { hit.normal } else { -hit.normal };

        Self {
            distance: hit.distance,
            point: hit.point,
            normal,
            material,
            shape,
        }
    }

    /// Strict ordering used by every query: smaller distance wins, equal
    /// distances go to the lower shape id.
    pub fn is_closer_than(&self, other: &Intersection) -> bool {
        self.distance < other.distance || (self.distance == other.distance && self.shape < other.shape)
    }
}

/// Pick the closer of two optional intersections.
pub fn closest<'a>(a: Option<Intersection<'a>>, b: Option<Intersection<'a>>) -> Option<Intersection<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.is_closer_than(&a) { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_at(distance: f32) -> SurfaceHit {
        SurfaceHit {
            distance,
            point: Vec3::new(0.0, 0.0, -distance),
            normal: Vec3::Z,
        }
    }

    #[test]
    fn test_face_normal() {
        let material = Material::default();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let front = Intersection::new(&ray, hit_at(1.0), &material, ShapeId(0));
        assert_eq!(front.normal, Vec3::Z);

        let inside = SurfaceHit {
            normal: Vec3::NEG_Z,
            ..hit_at(1.0)
        };
        let back = Intersection::new(&ray, inside, &material, ShapeId(0));
        assert_eq!(back.normal, Vec3::Z);
    }

    #[test]
    fn test_closest_tie_break() {
        let material = Material::default();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let a = Intersection::new(&ray, hit_at(2.0), &material, ShapeId(3));
        let b = Intersection::new(&ray, hit_at(2.0), &material, ShapeId(1));
        let c = Intersection::new(&ray, hit_at(1.0), &material, ShapeId(7));

        assert_eq!(closest(Some(a), Some(b)).map(|h| h.shape), Some(ShapeId(1)));
        assert_eq!(closest(Some(b), Some(a)).map(|h| h.shape), Some(ShapeId(1)));
        assert_eq!(closest(Some(a), Some(c)).map(|h| h.shape), Some(ShapeId(7)));
        assert_eq!(closest(None, Some(a)).map(|h| h.shape), Some(ShapeId(3)));
        assert!(closest(None, None).is_none());
    }
}
