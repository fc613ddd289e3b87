/// A 32 bit fixed point phase accumulator is represented here
///
/// A full cycle is `2^32`, the accumulator wraps around naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseAccumulator {
    accumulator: u32,
    rolled_over: bool,
}

impl PhaseAccumulator {
    /// `PhaseAccumulator::new()` is a new phase accumulator at the start of its cycle
    pub fn new() -> Self {
        Self::default()
    }

    /// `pa.advance(d)` moves the phase by `d`, forward for positive `d` and backward for negative `d`
    pub fn advance(&mut self, delta: i32) {
        let (next, wrapped) = if 0 <= delta {
            self.accumulator.overflowing_add(delta as u32)
        } else {
            self.accumulator.overflowing_sub(delta.unsigned_abs())
        };

        self.accumulator = next;
        if wrapped {
            self.rolled_over = true;
        }
    }

    /// `pa.set_phase(p)` puts the accumulator at phase `p`
    pub fn set_phase(&mut self, phase: u32) {
        self.accumulator = phase;
    }

    /// `pa.phase()` is the current phase
    pub fn phase(&self) -> u32 {
        self.accumulator
    }

    /// `pa.rolled_over()` is true iff the phase accumulator has rolled over into a new cycle since checking
    ///
    /// Self clearing
    pub fn rolled_over(&mut self) -> bool {
        if self.rolled_over {
            self.rolled_over = false;
            true
        } else {
            false
        }
    }

    /// `pa.reset()` resets the phase accumulator to zero
    pub fn reset(&mut self) {
        self.accumulator = 0;
        self.rolled_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_the_phase() {
        let mut pa = PhaseAccumulator::new();
        pa.advance(1_000);
        assert_eq!(pa.phase(), 1_000);
        pa.advance(-400);
        assert_eq!(pa.phase(), 600);
    }

    #[test]
    fn accum_rolls_over_forward() {
        let mut pa = PhaseAccumulator::new();
        let quarter = 1 << 30;

        // three quarters of a cycle, no rollover yet
        for _ in 0..3 {
            pa.advance(quarter);
        }
        assert!(!pa.rolled_over());

        // one more rolls back to the beginning
        pa.advance(quarter);
        assert_eq!(pa.phase(), 0);
        assert!(pa.rolled_over());

        // it's self clearing
        assert!(!pa.rolled_over());
    }

    #[test]
    fn accum_rolls_over_backward() {
        let mut pa = PhaseAccumulator::new();
        pa.advance(-1);
        assert_eq!(pa.phase(), u32::MAX);
        assert!(pa.rolled_over());
    }

    #[test]
    fn reset_zeros_the_accum() {
        let mut pa = PhaseAccumulator::new();
        pa.advance(12_345);
        pa.reset();
        assert_eq!(pa.phase(), 0);
        assert!(!pa.rolled_over());
    }
}
