//! # Oscillator contract
//!
//! The signal routing engine drives four oscillators through this small set of operations and never looks inside
//! them. Linking is expressed by channel index: a linked oscillator remembers the index of its master, and the engine
//! hands it the master's phase on every step, so changing topology never invalidates anything.

/// The waveshapes an oscillator can render are represented here
///
/// The classic bank and the random bank are each a family of four shapes, see [`LfoShape::classic`] and
/// [`LfoShape::random`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LfoShape {
    Sine,
    Trapezoid,
    Triangle,
    RampUp,
    RampDown,
    Square,
    /// a new random level every cycle, held for the whole cycle
    RandomStep,
    /// straight lines between random levels
    RandomLinear,
    /// eased curves between random levels
    RandomSmooth,
    /// full scale high or low, chosen at random every cycle
    RandomGate,
}

impl LfoShape {
    /// `LfoShape::classic(i)` is shape `i` of the classic family, wrapping around after four
    pub fn classic(idx: u8) -> Self {
        match idx % 4 {
            0 => LfoShape::Trapezoid,
            1 => LfoShape::Triangle,
            2 => LfoShape::RampUp,
            _ => LfoShape::RampDown,
        }
    }

    /// `LfoShape::random(i)` is shape `i` of the random family, wrapping around after four
    pub fn random(idx: u8) -> Self {
        match idx % 4 {
            0 => LfoShape::RandomStep,
            1 => LfoShape::RandomLinear,
            2 => LfoShape::RandomSmooth,
            _ => LfoShape::RandomGate,
        }
    }
}

/// A single LFO voice as seen by the signal routing engine is represented here
pub trait Oscillator {
    /// `o.init()` returns the oscillator to its power-on state, unlinked with unity ratios
    fn init(&mut self);

    /// `o.reset(s)` restarts the cycle, `s` in `[0, 32]` is how far into the tick the reset actually happened
    fn reset(&mut self, subsample: u8);

    /// `o.set_pitch(p)` sets the rate from pitch `p` in 1/128 semitone units
    fn set_pitch(&mut self, pitch: i16);

    /// `o.set_period(n)` sets the rate so that one cycle lasts `n` ticks
    fn set_period(&mut self, ticks: u32);

    /// `o.align()` brings the phase back to the start of the cycle without disturbing the rate
    fn align(&mut self);

    /// `o.set_level(l)` sets the output level, full scale is `u16::MAX`
    fn set_level(&mut self, level: u16);

    /// `o.set_divider(n)` runs the oscillator `n` times slower than its reference
    fn set_divider(&mut self, divider: u8);

    /// `o.set_multiplier(n)` runs the oscillator `n` times faster than its reference
    fn set_multiplier(&mut self, multiplier: u8);

    /// `o.link_to(m)` makes the oscillator follow the phase of the oscillator at channel index `m`
    fn link_to(&mut self, master: usize);

    /// `o.master()` is the channel index of the oscillator this one follows, if any
    fn master(&self) -> Option<usize>;

    /// `o.set_hold(h)` freezes the phase while `h` is true
    fn set_hold(&mut self, hold: bool);

    /// `o.set_direction(f)` runs the phase forward when `f` is true and backward otherwise
    fn set_direction(&mut self, forward: bool);

    /// `o.set_initial_phase(p)` offsets the output phase by `p`, a full cycle is `u16::MAX + 1`
    fn set_initial_phase(&mut self, phase: u16);

    /// `o.phase()` is the current phase of the cycle, a full cycle is `2^32`
    fn phase(&self) -> u32;

    /// `o.step(m)` advances the oscillator by one tick, `m` is the master's phase when the oscillator is linked
    fn step(&mut self, master_phase: Option<u32>);

    /// `o.compute_sample(s)` is the current output for shape `s`, scaled by the level
    fn compute_sample(&self, shape: LfoShape) -> i16;

    /// `o.level()` is the current output level
    fn level(&self) -> u16;
}
