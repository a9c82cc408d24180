use rand::Rng;

/// Roll a d100 and succeed when it lands at or under `chance_percent`.
pub fn roll_percent<R: Rng + ?Sized>(rng: &mut R, chance_percent: f32) -> bool {
    let roll = rng.random_range(1..=100u32);
    roll as f32 <= chance_percent
}

/// Uniform pick in `[lo, hi]`. A degenerate range returns `lo`.
pub fn range_f32<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..=hi)
}

/// Fair coin mapped onto a direction sign.
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { -1.0 } else { 1.0 }
}

/// Percentage-weighted table over a d100 roll.
///
/// Entries are walked in order with cumulative weights; a roll past the last
/// cumulative bound yields the remainder value (`None` means "no pick").
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    remainder: Option<T>,
}

impl<T: Copy> WeightedTable<T> {
    pub fn new(entries: Vec<(T, u32)>, remainder: Option<T>) -> Self {
        Self { entries, remainder }
    }

    /// Resolve a roll in `1..=100`.
    pub fn pick_with_roll(&self, roll: u32) -> Option<T> {
        let mut bound = 0u32;
        for &(value, weight) in &self.entries {
            bound += weight;
            if roll <= bound {
                return Some(value);
            }
        }
        self.remainder
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        self.pick_with_roll(rng.random_range(1..=100u32))
    }

    /// Sum of the explicit weights; the remainder bucket covers the rest.
    pub fn explicit_weight(&self) -> u32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shape {
        A,
        B,
        Rest,
    }

    #[test]
    fn cumulative_buckets() {
        let table = WeightedTable::new(vec![(Shape::A, 60), (Shape::B, 20)], Some(Shape::Rest));
        assert_eq!(table.pick_with_roll(1), Some(Shape::A));
        assert_eq!(table.pick_with_roll(60), Some(Shape::A));
        assert_eq!(table.pick_with_roll(61), Some(Shape::B));
        assert_eq!(table.pick_with_roll(80), Some(Shape::B));
        assert_eq!(table.pick_with_roll(81), Some(Shape::Rest));
        assert_eq!(table.pick_with_roll(100), Some(Shape::Rest));
    }

    #[test]
    fn remainder_can_be_none() {
        let table = WeightedTable::new(vec![(Shape::A, 10)], None);
        assert_eq!(table.pick_with_roll(11), None);
        assert_eq!(table.explicit_weight(), 10);
    }

    #[test]
    fn zero_and_full_chances() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(!roll_percent(&mut rng, 0.0));
            assert!(roll_percent(&mut rng, 100.0));
        }
    }

    #[test]
    fn degenerate_range_returns_low() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(range_f32(&mut rng, 80.0, 80.0), 80.0);
        assert_eq!(range_f32(&mut rng, 90.0, 10.0), 90.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn range_stays_in_bounds(seed in 0u64..500, lo in -500.0f32..500.0, span in 0.0f32..500.0) {
                let mut rng = StdRng::seed_from_u64(seed);
                let v = range_f32(&mut rng, lo, lo + span);
                prop_assert!(v >= lo && v <= lo + span);
            }
        }
    }
}
