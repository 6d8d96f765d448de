use crate::{Interval, Ray, Vec3};

/// Direction components no larger than this are treated as axis-parallel in
/// the slab test.
///
/// A parallel ray only touches the box if its origin lies inside that slab
/// (boundaries included). Components this small drift less than `1e-3` over a
/// distance of `1e6`, so the approximation only matters for absurd scenes.
pub const AXIS_EPSILON: f32 = 1e-9;

/// A coordinate axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis in a `Vec3`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Axis-Aligned Bounding Box for the partition tree.
///
/// An AABB is stored by its minimum and maximum corners. The box of zero
/// shapes is the empty sentinel `min = +inf, max = -inf` ([`Aabb::EMPTY`]),
/// which every expansion replaces.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from its corners. `min` must be componentwise <= `max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        let mut aabb = *box0;
        aabb.expand(box1);
        aabb
    }

    /// Returns true for the empty sentinel (or any inverted box).
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Grow the box to cover `other`. Expanding by the same box twice is a no-op.
    pub fn expand(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Grow the box to cover a single point.
    pub fn expand_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Inclusive componentwise containment test.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns true if the two boxes share at least one point.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Extent of the box along an axis.
    pub fn extent(&self, axis: Axis) -> f32 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    /// Returns the axis with the longest extent.
    ///
    /// Ties are broken in the fixed order X, then Y, then Z.
    pub fn longest_axis(&self) -> Axis {
        let x = self.extent(Axis::X);
        let y = self.extent(Axis::Y);
        let z = self.extent(Axis::Z);

        if x >= y && x >= z {
            Axis::X
        } else if y >= z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Lower half of the box, bisected at the midpoint of the longest axis.
    pub fn split_left(&self) -> Aabb {
        let axis = self.longest_axis().index();
        let mut max = self.max;
        max[axis] = self.centroid()[axis];
        Aabb::new(self.min, max)
    }

    /// Upper half of the box, bisected at the midpoint of the longest axis.
    pub fn split_right(&self) -> Aabb {
        let axis = self.longest_axis().index();
        let mut min = self.min;
        min[axis] = self.centroid()[axis];
        Aabb::new(min, self.max)
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (i, a) = (self.min, self.max);
        [
            Vec3::new(i.x, i.y, i.z),
            Vec3::new(a.x, i.y, i.z),
            Vec3::new(i.x, a.y, i.z),
            Vec3::new(a.x, a.y, i.z),
            Vec3::new(i.x, i.y, a.z),
            Vec3::new(a.x, i.y, a.z),
            Vec3::new(i.x, a.y, a.z),
            Vec3::new(a.x, a.y, a.z),
        ]
    }

    /// Parametric interval over which the ray is inside the box.
    ///
    /// Uses the slab method. Returns `None` when the per-axis intervals do not
    /// overlap or the whole box lies behind the ray origin. The returned
    /// interval may start before zero when the origin is inside the box.
    pub fn slab(&self, ray: &Ray) -> Option<Interval> {
        if self.is_empty() || ray.is_degenerate() {
            return None;
        }

        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;

        for axis in 0..3 {
            let d = ray.direction[axis];
            let o = ray.origin[axis];
            if d.abs() <= AXIS_EPSILON {
                // Parallel to this slab: inside it everywhere or nowhere
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let t0 = (self.min[axis] - o) / d;
            let t1 = (self.max[axis] - o) / d;

            near = near.max(t0.min(t1));
            far = far.min(t0.max(t1));
        }

        // Entire box is behind the origin
        if far < 0.0 {
            return None;
        }
        if near > far {
            return None;
        }

        Some(Interval::new(near, far))
    }

    /// Test if a ray intersects this AABB.
    pub fn hit(&self, ray: &Ray) -> bool {
        self.slab(ray).is_some()
    }

    /// The empty box (contains nothing, identity for `expand`).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
