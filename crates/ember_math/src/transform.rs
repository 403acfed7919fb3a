// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); this adds the bounding-box transform instances need.

use crate::Aabb;
use glam::{Mat4, Vec3};

/// Extension trait for Mat4 with bounding-box support.
pub trait Mat4Ext {
    /// Bounding box of the 8 transformed corners of `aabb`.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let lo = aabb.min();
        let hi = aabb.max();

        let mut result_min = Vec3::splat(f32::INFINITY);
        let mut result_max = Vec3::splat(f32::NEG_INFINITY);

        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let p = self.transform_point3(corner);
            result_min = result_min.min(p);
            result_max = result_max.max(p);
        }

        Aabb::from_points(result_min, result_max)
    }
}
