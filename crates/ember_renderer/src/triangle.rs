//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use ember_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Determinant threshold below which the ray is treated as parallel.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle primitive.
pub struct Triangle<M: Material> {
    v0: Vec3,
    /// Edges v1 - v0 and v2 - v0
    edge1: Vec3,
    edge2: Vec3,
    /// Pre-computed face normal (zero for degenerate triangles)
    normal: Vec3,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Triangle<M> {
    /// Create a new triangle from three vertices. The face normal follows
    /// the counter-clockwise winding `v0 -> v1 -> v2`.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: M) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize_or_zero();

        // from_points pads any axis the triangle is flat in
        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            edge1,
            edge2,
            normal,
            material,
            bbox,
        }
    }
}

impl<M: Material + 'static> Hittable for Triangle<M> {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let h = ray.direction().cross(self.edge2);
        let a = self.edge1.dot(h);

        // Ray is parallel to the triangle, or the triangle has no area
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, (u, v), &self.material))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
