//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::{Material, Ray};
use ember_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record at parameter `t`, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        (u, v): (f32, f32),
        material: &'a dyn Material,
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Anything a ray can be tested against.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t`, if any.
    ///
    /// `rng` is the caller's sample stream; only stochastic objects such as
    /// participating media draw from it.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore)
        -> Option<HitRecord<'a>>;

    /// Box enclosing everything this object can ever report a hit on.
    fn bounding_box(&self) -> Aabb;
}

impl<H: Hittable + ?Sized> Hittable for Arc<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }
}

/// A list of hittable objects, searched linearly.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add<H: Hittable + 'static>(&mut self, object: H) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(Box::new(object));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Take the children, e.g. to build a BVH over them.
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Box<dyn Hittable>> for HittableList {
    fn from_iter<I: IntoIterator<Item = Box<dyn Hittable>>>(iter: I) -> Self {
        let mut list = Self::new();
        for object in iter {
            list.bbox = Aabb::surrounding(&list.bbox, &object.bounding_box());
            list.objects.push(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, max), rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
