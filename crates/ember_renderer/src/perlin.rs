//! Perlin gradient noise.

use crate::sampling::random_vec3;
use ember_math::Vec3;
use rand::seq::SliceRandom;
use rand::RngCore;

const POINT_COUNT: usize = 256;

/// Lattice gradient noise with random unit gradients and permuted hashing.
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT)
            .map(|_| random_vec3(rng, -1.0, 1.0).try_normalize().unwrap_or(Vec3::X))
            .collect();

        Self {
            gradients,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
        perm.shuffle(rng);
        perm
    }

    /// Noise value at `p`, roughly in `[-1, 1]`.
    pub fn noise(&self, p: Vec3) -> f32 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i64;
        let j = p.y.floor() as i64;
        let k = p.z.floor() as i64;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let hash = self.perm_x[wrap(i + di as i64)]
                        ^ self.perm_y[wrap(j + dj as i64)]
                        ^ self.perm_z[wrap(k + dk as i64)];
                    *cell = self.gradients[hash];
                }
            }
        }

        trilinear_interp(&c, u, v, w)
    }

    /// Sum of `depth` octaves of |noise|, each at double frequency and half
    /// weight.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

#[inline]
fn wrap(n: i64) -> usize {
    (n & (POINT_COUNT as i64 - 1)) as usize
}

fn trilinear_interp(c: &[[[Vec3; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
    // Hermite smoothing removes grid artifacts
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * gradient.dot(weight);
            }
        }
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(9));

        // Gradient noise vanishes at integer coordinates
        for p in [Vec3::ZERO, Vec3::new(3.0, -2.0, 7.0), Vec3::splat(100.0)] {
            assert!(perlin.noise(p).abs() < 1e-6);
        }
    }

    #[test]
    fn test_noise_is_bounded_and_continuous() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(10));
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let p = random_vec3(&mut rng, -50.0, 50.0);
            let n = perlin.noise(p);
            assert!(n.abs() <= 1.8, "noise out of range: {n}");

            let nearby = perlin.noise(p + Vec3::splat(1e-4));
            assert!((n - nearby).abs() < 0.01);
        }
    }

    #[test]
    fn test_turbulence_is_non_negative() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(12));
        let mut rng = StdRng::seed_from_u64(13);

        for _ in 0..200 {
            assert!(perlin.turbulence(random_vec3(&mut rng, -10.0, 10.0), 7) >= 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_noise() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(42));
        let b = Perlin::new(&mut StdRng::seed_from_u64(42));
        let p = Vec3::new(1.3, 2.7, -0.4);

        assert_eq!(a.noise(p), b.noise(p));
    }
}
