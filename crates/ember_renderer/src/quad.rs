//! Planar parallelogram primitive and axis-aligned boxes built from it.

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    Material, Ray,
};
use ember_math::{Aabb, Interval, Vec3};
use rand::RngCore;

const PARALLEL_EPSILON: f32 = 1e-8;

/// Parallelogram with corner `q` spanned by edges `u` and `v`.
pub struct Quad<M: Material> {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` for the unnormalized plane normal `n = u x v`
    w: Vec3,
    normal: Vec3,
    /// Plane offset: `normal . x = d`
    d: f32,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Quad<M> {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: M) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let n_sq = n.length_squared();
        let w = if n_sq > 0.0 { n / n_sq } else { Vec3::ZERO };

        let diagonal1 = Aabb::from_points(q, q + u + v);
        let diagonal2 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d: normal.dot(q),
            material,
            bbox: Aabb::surrounding(&diagonal1, &diagonal2),
        }
    }
}

impl<M: Material + 'static> Hittable for Quad<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane, or a zero-area quad
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        // Planar coordinates of the hit point relative to q
        let planar = ray.at(t) - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));

        if !Interval::UNIT.contains(alpha) || !Interval::UNIT.contains(beta) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, (alpha, beta), &self.material))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// The six faces of the axis-aligned box with opposite corners `a` and `b`.
pub fn cuboid<M>(a: Vec3, b: Vec3, material: M) -> HittableList
where
    M: Material + Clone + 'static,
{
    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    let mut sides = HittableList::new();
    // front, right, back, left, top, bottom
    sides.add(Quad::new(Vec3::new(min.x, min.y, max.z), dx, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(max.x, min.y, max.z), -dz, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(max.x, min.y, min.z), -dx, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dz, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, max.y, max.z), dx, -dz, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dx, dz, material));
    sides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Lambertian {
        Lambertian::new(Vec3::splat(0.5))
    }

    fn t_range() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    #[test]
    fn test_quad_hit_reports_planar_coordinates() {
        // 2x4 quad in the z = -1 plane
        let quad = Quad::new(
            Vec3::new(-1.0, -2.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
            gray(),
        );
        let ray = Ray::new_simple(Vec3::new(0.5, 1.0, 0.0), -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = quad.hit(&ray, t_range(), &mut rng).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!((rec.u - 0.75).abs() < 1e-5);
        assert!((rec.v - 0.75).abs() < 1e-5);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_quad_miss_outside() {
        let quad = Quad::new(Vec3::ZERO, Vec3::X, Vec3::Y, gray());
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new_simple(Vec3::new(1.5, 0.5, 1.0), -Vec3::Z);
        assert!(quad.hit(&ray, t_range(), &mut rng).is_none());

        let ray = Ray::new_simple(Vec3::new(0.5, -0.1, 1.0), -Vec3::Z);
        assert!(quad.hit(&ray, t_range(), &mut rng).is_none());
    }

    #[test]
    fn test_quad_parallel_ray_misses() {
        let quad = Quad::new(Vec3::ZERO, Vec3::X, Vec3::Y, gray());
        let ray = Ray::new_simple(Vec3::new(-1.0, 0.5, 0.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(quad.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_degenerate_quad_never_hits() {
        let quad = Quad::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, gray());
        let mut rng = StdRng::seed_from_u64(0);

        for dir in [Vec3::X, Vec3::Y, -Vec3::Z] {
            let ray = Ray::new_simple(Vec3::new(0.5, 0.0, 0.0) - dir, dir);
            assert!(quad.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
        }
    }

    #[test]
    fn test_quad_bbox_is_padded() {
        let quad = Quad::new(Vec3::ZERO, Vec3::X, Vec3::Y, gray());
        let bbox = quad.bounding_box();

        assert!(bbox.z.size() > 0.0);
        assert!(bbox.contains_point(Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_cuboid_hit_from_every_axis() {
        let cube = cuboid(Vec3::splat(1.0), Vec3::splat(-1.0), gray());
        assert_eq!(cube.len(), 6);

        let mut rng = StdRng::seed_from_u64(0);
        for axis in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
            let ray = Ray::new_simple(axis * 5.0, -axis);
            let rec = cube.hit(&ray, t_range(), &mut rng).unwrap();

            assert!((rec.t - 4.0).abs() < 1e-4);
            assert!((rec.normal - axis).length() < 1e-5);
            assert!(rec.front_face);
        }
    }

    #[test]
    fn test_quad_hit_at_range_bounds_rejected() {
        let quad = Quad::new(Vec3::ZERO, Vec3::X, Vec3::Y, gray());
        // Hits the plane at exactly t = 5
        let ray = Ray::new_simple(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(quad.hit(&ray, Interval::new(0.001, 5.0), &mut rng).is_none());
        assert!(quad.hit(&ray, Interval::new(5.0, f32::INFINITY), &mut rng).is_none());

        let rec = quad.hit(&ray, Interval::new(0.001, 5.5), &mut rng).unwrap();
        assert_eq!(rec.t, 5.0);
    }
}
