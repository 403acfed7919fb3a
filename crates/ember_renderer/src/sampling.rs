//! Random sampling helpers.
//!
//! Every helper draws from the caller's generator so each render worker can
//! own a private, seedable stream.

use ember_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform sample in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform sample in `[min, max)`.
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Vector with each component uniform in `[min, max)`.
pub fn random_vec3(rng: &mut dyn RngCore, min: f32, max: f32) -> Vec3 {
    Vec3::new(
        gen_range(rng, min, max),
        gen_range(rng, min, max),
        gen_range(rng, min, max),
    )
}

/// Uniform point inside the unit sphere (rejection sampling).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        let len_sq = p.length_squared();
        // Tiny vectors lose precision when normalized
        if len_sq > 1e-30 && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform point inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// True if every component is within `1e-8` of zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    const S: f32 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_random_in_unit_sphere_and_disk() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            assert!(random_in_unit_sphere(&mut rng).length_squared() < 1.0);

            let d = random_in_unit_disk(&mut rng);
            assert!(d.length_squared() < 1.0);
            assert_eq!(d.z, 0.0);
        }
    }

    #[test]
    fn test_gen_range_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let x = gen_range(&mut rng, 2.0, 5.0);
            assert!((2.0..5.0).contains(&x));
        }
    }

    #[test]
    fn test_near_zero() {
        assert!(near_zero(Vec3::splat(1e-9)));
        assert!(!near_zero(Vec3::new(0.0, 0.0, 1e-7)));
    }
}
