// Transform utilities for Mat4
//
// Extends glam::Mat4 with the affine helpers the intersection code needs.
// Note: glam::Mat4 already provides transform_point3(), transform_vector3()
// and inverse()

use glam::{Mat3, Mat4, Vec3};
use crate::Aabb;

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Inverse-transpose of the upper 3x3 block, used to carry normals.
    fn normal_matrix(&self) -> Mat3;

    /// Transform a surface normal and renormalize it.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// Upper bound on how much the linear part can lengthen a vector.
    ///
    /// Exact for rotation/scale matrices (orthogonal columns); falls back to
    /// the Frobenius norm, which bounds the spectral norm, for shears.
    fn max_stretch(&self) -> f32;
}

impl Mat4Ext for Mat4 {
    fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(*self).inverse().transpose()
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        (self.normal_matrix() * normal).normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }

        aabb.corners()
            .iter()
            .fold(Aabb::EMPTY, |mut acc, &corner| {
                acc.expand_point(self.transform_point3(corner));
                acc
            })
    }

    fn max_stretch(&self) -> f32 {
        let cols = [
            self.x_axis.truncate(),
            self.y_axis.truncate(),
            self.z_axis.truncate(),
        ];
        let lengths = cols.map(Vec3::length);
        let longest = lengths[0].max(lengths[1]).max(lengths[2]);

        let tolerance = 1e-5 * longest * longest;
        let orthogonal = cols[0].dot(cols[1]).abs() <= tolerance
            && cols[1].dot(cols[2]).abs() <= tolerance
            && cols[0].dot(cols[2]).abs() <= tolerance;

        if orthogonal {
            longest
        } else {
            lengths.iter().map(|l| l * l).sum::<f32>().sqrt()
        }
    }
}
