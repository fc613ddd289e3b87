/// A small PCG32 pseudo random number generator, used by the random waveshapes
///
/// Deterministic, the same seed always gives the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// `Rng::new(s)` is a new random number generator with seed `s`
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x2C92_77B5_27D4_EB2D),
        }
    }

    /// `rng.next_u32()` is the next random number in the sequence
    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = old
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let xor_shifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// `rng.next_i16()` is the next random number in the sequence as a bipolar sample
    pub fn next_i16(&mut self) -> i16 {
        (self.next_u32() >> 16) as u16 as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Rng::new(1);
        let mut b = Rng::new(2);
        assert!((0..10).any(|_| a.next_u32() != b.next_u32()));
    }

    #[test]
    fn samples_cover_both_polarities() {
        let mut rng = Rng::new(7);
        let samples: heapless::Vec<i16, 64> = (0..64).map(|_| rng.next_i16()).collect();
        assert!(samples.iter().any(|&s| s < 0));
        assert!(samples.iter().any(|&s| 0 < s));
    }
}
