/// A closed range of scalars `[min, max]`.
///
/// Used for valid ray-parameter ranges, bounding-box slabs and color clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval::new(f32::INFINITY, f32::NEG_INFINITY);

    /// A universe interval (contains everything).
    pub const UNIVERSE: Interval = Interval::new(f32::NEG_INFINITY, f32::INFINITY);

    /// The unit interval `[0, 1]`.
    pub const UNIT: Interval = Interval::new(0.0, 1.0);

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Returns true if x is within `[min, max]` (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns true if x is strictly within `(min, max)` (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Clamps x into `[min, max]`.
    ///
    /// Unlike `f32::clamp` this never panics on an inverted interval; the
    /// lower bound wins.
    pub fn clamp(&self, x: f32) -> f32 {
        if x < self.min {
            self.min
        } else if x > self.max {
            self.max
        } else {
            x
        }
    }

    /// Grows the interval by `delta / 2` on each side.
    pub fn expand(&self, delta: f32) -> Interval {
        let padding = delta / 2.0;
        Interval::new(self.min - padding, self.max + padding)
    }

    /// Shifts both bounds by `displacement`.
    pub fn add_scalar(&self, displacement: f32) -> Interval {
        Interval::new(self.min + displacement, self.max + displacement)
    }

    /// Smallest interval enclosing both `a` and `b`.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_size() {
        assert_eq!(Interval::new(2.0, 7.0).size(), 5.0);
        assert_eq!(Interval::new(-5.0, 5.0).size(), 10.0);
    }

    #[test]
    fn test_interval_contains_is_closed() {
        let interval = Interval::new(0.0, 10.0);

        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(interval.contains(5.0));
        assert!(!interval.contains(-0.1));
        assert!(!interval.contains(10.1));
    }

    #[test]
    fn test_interval_surrounds_is_open() {
        let interval = Interval::new(0.0, 10.0);

        assert!(!interval.surrounds(0.0));
        assert!(!interval.surrounds(10.0));
        assert!(interval.surrounds(0.1));
        assert!(interval.surrounds(9.9));
        assert!(!interval.surrounds(10.1));
    }

    #[test]
    fn test_interval_clamp() {
        let intensity = Interval::new(0.0, 0.999);

        assert_eq!(intensity.clamp(-5.0), 0.0);
        assert_eq!(intensity.clamp(0.5), 0.5);
        assert_eq!(intensity.clamp(1.5), 0.999);
    }

    #[test]
    fn test_interval_expand() {
        let expanded = Interval::new(0.0, 10.0).expand(4.0);

        assert_eq!(expanded.min, -2.0);
        assert_eq!(expanded.max, 12.0);
    }

    #[test]
    fn test_interval_surrounding() {
        let a = Interval::new(1.0, 3.0);
        let b = Interval::new(-2.0, 2.0);
        assert_eq!(Interval::surrounding(&a, &b), Interval::new(-2.0, 3.0));

        // Empty is the identity for unions
        assert_eq!(Interval::surrounding(&Interval::EMPTY, &a), a);
    }

    #[test]
    fn test_interval_empty_and_universe() {
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(!Interval::EMPTY.contains(f32::INFINITY));

        assert!(Interval::UNIVERSE.contains(1e10));
        assert!(Interval::UNIVERSE.contains(-1e10));
        assert_eq!(Interval::UNIVERSE.size(), f32::INFINITY);
    }
}
