//! Homogeneous participating media (smoke, fog) bounded by a closed surface.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::gen_f32;
use crate::texture::Texture;
use crate::{Color, Isotropic, Ray};
use ember_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Offset between the entry crossing and the search for the exit crossing.
const EXIT_SEARCH_OFFSET: f32 = 0.0001;

/// Volume of constant density inside `boundary`.
///
/// The boundary must be closed and convex for the entry/exit search to be
/// meaningful. A density that is not positive gives an empty medium.
pub struct ConstantMedium<H: Hittable> {
    boundary: H,
    neg_inv_density: f32,
    phase_function: Isotropic,
}

impl<H: Hittable> ConstantMedium<H> {
    pub fn new(boundary: H, density: f32, albedo: Color) -> Self {
        Self::with_phase(boundary, density, Isotropic::new(albedo))
    }

    pub fn from_texture(boundary: H, density: f32, texture: Arc<dyn Texture>) -> Self {
        Self::with_phase(boundary, density, Isotropic::from_texture(texture))
    }

    fn with_phase(boundary: H, density: f32, phase_function: Isotropic) -> Self {
        let neg_inv_density = if density > 0.0 {
            -1.0 / density
        } else {
            f32::NEG_INFINITY
        };
        Self {
            boundary,
            neg_inv_density,
            phase_function,
        }
    }
}

impl<H: Hittable> Hittable for ConstantMedium<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_SEARCH_OFFSET, f32::INFINITY),
            rng,
        )?;

        let t_enter = entry.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        // 1 - U avoids ln(0)
        let hit_distance = self.neg_inv_density * (1.0 - gen_f32(rng)).ln();

        // An empty medium yields inf or NaN here
        if !hit_distance.is_finite() || hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        if !ray_t.surrounds(t) {
            return None;
        }

        // Scattering inside a volume has no surface orientation
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: &self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}
