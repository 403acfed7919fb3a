//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use ember_math::{Aabb, Interval, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive, optionally moving linearly over the shutter interval.
pub struct Sphere<M: Material> {
    /// Center at time 0
    center: Vec3,
    /// Displacement from time 0 to time 1 (zero for static spheres)
    motion: Vec3,
    radius: f32,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Sphere<M> {
    /// Create a new stationary sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            motion: Vec3::ZERO,
            radius,
            material,
            bbox,
        }
    }

    /// Create a sphere moving from `center0` at time 0 to `center1` at time 1.
    pub fn moving(center0: Vec3, center1: Vec3, radius: f32, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Self {
            center: center0,
            motion: center1 - center0,
            radius,
            material,
            bbox: Aabb::surrounding(&box0, &box1),
        }
    }

    /// Center at the given time.
    #[inline]
    pub fn center(&self, time: f32) -> Vec3 {
        self.center + time * self.motion
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl<M: Material + 'static> Hittable for Sphere<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if a == 0.0 || discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = if self.radius > 0.0 {
            (p - center) / self.radius
        } else {
            // A point sphere has no surface orientation; face the viewer
            -ray.direction().normalize()
        };

        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            Self::get_sphere_uv(outward_normal),
            &self.material,
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Lambertian {
        Lambertian::new(Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let interval = Interval::new(0.001, f32::INFINITY);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere.hit(&ray, interval, &mut rng).unwrap();
        assert!((rec.t - 0.5).abs() < 0.001);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
        assert!(rec.front_face);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());

        // Ray pointing away from sphere
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let interval = Interval::new(0.001, f32::INFINITY);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(sphere.hit(&ray, interval, &mut rng).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_is_back_face() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, gray());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 2.0).abs() < 1e-4);
        assert!(!rec.front_face);
        assert!((rec.normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_t_is_strictly_inside_range() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        // Both roots (0.5 and 1.5) lie outside the open range
        assert!(sphere.hit(&ray, Interval::new(0.6, 1.4), &mut rng).is_none());
        // Far root only
        let rec = sphere.hit(&ray, Interval::new(0.6, 2.0), &mut rng).unwrap();
        assert!((rec.t - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_negative_radius_clamped() {
        let sphere = Sphere::new(Vec3::ZERO, -3.0, gray());
        assert_eq!(sphere.radius(), 0.0);
    }

    #[test]
    fn test_zero_radius_normal_is_finite() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.0, gray());
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        // The ray passes straight through the point
        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert!(rec.normal.is_finite());
        assert!(rec.u.is_finite() && rec.v.is_finite());
    }

    #[test]
    fn test_sphere_uv() {
        // +X maps to u = 0.5, v = 0.5
        let (u, v) = Sphere::<Lambertian>::get_sphere_uv(Vec3::X);
        assert!((u - 0.5).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);

        // Poles map to v = 0 (bottom) and v = 1 (top)
        let (_, v) = Sphere::<Lambertian>::get_sphere_uv(-Vec3::Y);
        assert!(v.abs() < 1e-5);
        let (_, v) = Sphere::<Lambertian>::get_sphere_uv(Vec3::Y);
        assert!((v - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_moving_sphere_follows_time() {
        let sphere = Sphere::moving(
            Vec3::new(0.0, 0.0, -3.0),
            Vec3::new(2.0, 0.0, -3.0),
            0.5,
            gray(),
        );
        let mut rng = StdRng::seed_from_u64(0);
        let t_range = Interval::new(0.001, f32::INFINITY);

        let at_start = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert!(sphere.hit(&at_start, t_range, &mut rng).is_some());

        // At time 1 the sphere has moved out of the ray's path
        let at_end = Ray::new(Vec3::ZERO, -Vec3::Z, 1.0);
        assert!(sphere.hit(&at_end, t_range, &mut rng).is_none());

        let from_end = Ray::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::Z, 1.0);
        assert!(sphere.hit(&from_end, t_range, &mut rng).is_some());
    }

    #[test]
    fn test_moving_sphere_bbox_covers_motion() {
        let sphere = Sphere::moving(Vec3::ZERO, Vec3::new(4.0, 1.0, 0.0), 1.0, gray());
        let bbox = sphere.bounding_box();

        for i in 0..=10 {
            let c = sphere.center(i as f32 / 10.0);
            assert!(bbox.contains_point(c + Vec3::splat(1.0)));
            assert!(bbox.contains_point(c - Vec3::splat(1.0)));
        }
    }
}
