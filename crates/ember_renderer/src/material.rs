//! Material trait for surface scattering.

use std::sync::Arc;

use crate::sampling::{gen_f32, near_zero, random_in_unit_sphere, random_unit_vector};
use crate::texture::{SolidColor, Texture};
use crate::{hittable::HitRecord, Ray};
use ember_math::Vec3;
use rand::RngCore;

/// Color type alias (linear RGB, nominally 0-1 but unbounded for emitters)
pub type Color = Vec3;

/// Outcome of a successful scatter: the ray to follow and how much of its
/// radiance survives the bounce.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore)
        -> Option<ScatterResult>;

    /// Light emitted at the given UV coordinates and point.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

impl<M: Material + ?Sized> Material for Arc<M> {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        (**self).scatter(ray_in, rec, rng)
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        (**self).emitted(u, v, p)
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    texture: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with a constant albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn from_texture(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }
}

/// Cosine-weighted diffuse direction, falling back to the normal when the
/// random vector cancels it.
fn diffuse_direction(normal: Vec3, random_unit: Vec3) -> Vec3 {
    let direction = normal + random_unit;
    if near_zero(direction) {
        normal
    } else {
        direction
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let direction = diffuse_direction(rec.normal, random_unit_vector(rng));

        Some(ScatterResult {
            attenuation: self.texture.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Metal (specular) material.
#[derive(Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz can push the ray below the surface; absorb it
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f32, ratio: f32) -> f32 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        // Index-matched media have no interface to reflect from
        if r0 == 0.0 {
            return 0.0;
        }
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        let cannot_refract = ratio * sin_theta > 1.0;
        let direction =
            if cannot_refract || Self::reflectance(cos_theta, ratio) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, ratio)
            };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Diffuse light emitter.
#[derive(Clone)]
pub struct DiffuseLight {
    texture: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(emit)))
    }

    pub fn from_texture(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        self.texture.value(u, v, p)
    }
}

/// Phase function of a constant-density medium: scatters uniformly in all
/// directions.
#[derive(Clone)]
pub struct Isotropic {
    texture: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn from_texture(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        Some(ScatterResult {
            attenuation: self.texture.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, random_unit_vector(rng), ray_in.time()),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with relative index `etai_over_etat`.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
