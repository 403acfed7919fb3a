//! Instances: a child object placed in the world by a rigid transform.
//!
//! Rays are moved into the child's local space, intersected there, and the
//! hit is moved back. Ray directions are not renormalized, so `t` means the
//! same thing in both spaces.

use crate::{
    hittable::{HitRecord, Hittable},
    Ray,
};
use ember_math::{Aabb, Interval, Mat4, Mat4Ext, Vec3};
use rand::RngCore;

/// Child shifted by a constant offset.
pub struct Translate<H: Hittable> {
    object: H,
    offset: Vec3,
    bbox: Aabb,
}

impl<H: Hittable> Translate<H> {
    pub fn new(object: H, offset: Vec3) -> Self {
        let bbox = object.bounding_box().translate(offset);
        Self {
            object,
            offset,
            bbox,
        }
    }
}

impl<H: Hittable> Hittable for Translate<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Child rotated about the world Y axis.
pub struct RotateY<H: Hittable> {
    object: H,
    /// Local-to-world rotation
    transform: Mat4,
    /// World-to-local rotation
    inv_transform: Mat4,
    bbox: Aabb,
}

impl<H: Hittable> RotateY<H> {
    /// Rotate `object` by `degrees` counter-clockwise looking down -Y.
    pub fn new(object: H, degrees: f32) -> Self {
        let transform = Mat4::from_rotation_y(degrees.to_radians());
        let inv_transform = transform.inverse();

        let local_bbox = object.bounding_box();
        let bbox = if local_bbox == Aabb::EMPTY {
            Aabb::EMPTY
        } else {
            transform.transform_aabb(&local_bbox)
        };

        Self {
            object,
            transform,
            inv_transform,
            bbox,
        }
    }
}

impl<H: Hittable> Hittable for RotateY<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(
            self.inv_transform.transform_point3(ray.origin()),
            self.inv_transform.transform_vector3(ray.direction()),
            ray.time(),
        );

        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;

        // Rotations preserve orientation, so front_face carries over
        rec.p = self.transform.transform_point3(rec.p);
        rec.normal = self.transform.transform_vector3(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
