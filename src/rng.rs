#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        out as f64 / 4_294_967_296.0
    }

    /// Value in `[0, scale)` used to break exact priority ties.
    pub fn jitter(&mut self, scale: f64) -> f64 {
        self.next_f64() * scale
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.next_f64() * len as f64).floor() as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_repeats_sequence() {
        let mut a = Rng::new(77);
        let mut b = Rng::new(77);
        for _ in 0..64 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn jitter_stays_below_scale() {
        let mut rng = Rng::new(5);
        for _ in 0..1_000 {
            let value = rng.jitter(0.001);
            assert!((0.0..0.001).contains(&value));
        }
    }

    #[test]
    fn pick_index_covers_range_without_overflow() {
        let mut rng = Rng::new(9);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let idx = rng.pick_index(4);
            assert!(idx < 4);
            seen[idx] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
        assert_eq!(rng.pick_index(0), 0);
        assert_eq!(rng.pick_index(1), 0);
    }
}
