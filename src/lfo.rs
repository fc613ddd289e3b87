//! # Low Frequency Oscillator
//!
//! ## Acronyms used:
//!
//! - `LFO`: Low Frequency Oscillator
//! - `LUT`: Look Up Table
//! - `DDS`: Direct Digital Synthesis
//!
//! A fixed point reference implementation of the [`Oscillator`] contract, so that the routing engine can run off the
//! hardware, in tests and in simulations.
//!
//! The rate is set either by pitch or by period. Pitch is in 1/128 semitone units with pitch zero at 1 Hz, so each
//! octave is 1536 units. A free running LFO advances its phase by its own increment scaled by the multiplier and
//! divider, a linked LFO instead advances by the distance its master moved since the last step, scaled the same way.
//!
//! Since this oscillator is intended as a low frequency control source, no attempts at antialiasing are made.

use crate::{
    conversions::OCTAVE,
    lookup_tables::{SEMITONE_RATIO_TABLE, SINE_TABLE},
    oscillator::{LfoShape, Oscillator},
    phase_accumulator::PhaseAccumulator,
    rng::Rng,
    utils::*,
    NUM_CHANNELS,
};

/// A Low Frequency Oscillator is represented here
#[derive(Debug, Clone)]
pub struct Lfo {
    // increment for a 1 Hz cycle at this sample rate
    unity_increment: u32,

    phase_accumulator: PhaseAccumulator,

    // per-tick increment before the ratio is applied
    increment: u32,
    multiplier: u8,
    divider: u8,

    master: Option<usize>,
    last_master_phase: Option<u32>,
    // how far the last linked step moved, the per-tick rate of a linked LFO
    linked_increment: u32,

    hold: bool,
    forward: bool,
    initial_phase: u16,
    level: u16,

    rng: Rng,
    random_previous: i16,
    random_current: i16,
}

impl Lfo {
    /// `Lfo::new(sr, seed)` is a new LFO ticked at sample rate `sr`, its random shapes are seeded with `seed`
    pub fn new(sample_rate_hz: u32, seed: u64) -> Self {
        let mut lfo = Self {
            unity_increment: ((1_u64 << 32) / sample_rate_hz.max(1) as u64).min(MAX_INCREMENT as u64) as u32,
            phase_accumulator: PhaseAccumulator::new(),
            increment: 0,
            multiplier: 1,
            divider: 1,
            master: None,
            last_master_phase: None,
            linked_increment: 0,
            hold: false,
            forward: true,
            initial_phase: 0,
            level: u16::MAX,
            rng: Rng::new(seed),
            random_previous: 0,
            random_current: 0,
        };
        lfo.init();
        lfo
    }

    /// `Lfo::bank(sr)` is one LFO per channel, each with its own random sequence
    pub fn bank(sample_rate_hz: u32) -> [Self; NUM_CHANNELS] {
        core::array::from_fn(|ch| Self::new(sample_rate_hz, 0x5EED + ch as u64))
    }

    /// `lfo.increment()` is the per-tick phase increment before the multiplier and divider
    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// `lfo.tick_increment()` is how far the phase moves per tick, after the ratio and any linking
    fn tick_increment(&self) -> u32 {
        match self.master {
            Some(_) => self.linked_increment,
            None => {
                let scaled = self.increment as u64 * self.multiplier as u64 / self.divider as u64;
                scaled.min(MAX_INCREMENT as u64) as u32
            }
        }
    }

    /// `lfo.pitch_to_increment(p)` is the per-tick phase increment for pitch `p`
    fn pitch_to_increment(&self, pitch: i16) -> u32 {
        let pitch = pitch as i32;
        let octave = pitch.div_euclid(OCTAVE);
        let within = pitch.rem_euclid(OCTAVE);

        let semitone = (within >> 7) as usize;
        let frac = (within & 0x7F) as u64;
        let r0 = SEMITONE_RATIO_TABLE[semitone] as u64;
        let r1 = SEMITONE_RATIO_TABLE[semitone + 1] as u64;
        let ratio = r0 + (((r1 - r0) * frac) >> 7);

        let inc = (self.unity_increment as u64 * ratio) >> 16;
        let inc = if 0 <= octave {
            inc << octave.min(32)
        } else {
            inc >> (-octave).min(63)
        };
        inc.min(MAX_INCREMENT as u64) as u32
    }

    /// `lfo.output_phase()` is the phase after the initial phase offset, as a 16 bit LUT position
    fn output_phase(&self) -> u16 {
        (self.phase_accumulator.phase() >> 16).wrapping_add(self.initial_phase as u32) as u16
    }

    fn next_random(&mut self) {
        self.random_previous = self.random_current;
        self.random_current = self.rng.next_i16();
    }

    /// `lfo.raw_sample(s)` is the full scale output for shape `s`, before the level is applied
    fn raw_sample(&self, shape: LfoShape) -> i32 {
        let p = self.output_phase() as i32;
        match shape {
            LfoShape::Sine => interpolate_88(&SINE_TABLE, p as u16),
            LfoShape::Triangle => triangle(p),
            // a triangle driven twice as hard, flat at the top and bottom
            LfoShape::Trapezoid => constrain(triangle(p) * 2, -FULL_SCALE, FULL_SCALE),
            LfoShape::RampUp => p - 32_768,
            LfoShape::RampDown => 32_767 - p,
            LfoShape::Square => {
                if p < 32_768 {
                    FULL_SCALE
                } else {
                    -FULL_SCALE
                }
            }
            LfoShape::RandomStep => self.random_current as i32,
            LfoShape::RandomLinear => self.random_towards_current(p),
            LfoShape::RandomSmooth => {
                // smoothstep, 3t^2 - 2t^3
                let t = p as i64;
                let eased = ((t * t * (3 * 65_536 - 2 * t)) >> 32) as i32;
                self.random_towards_current(constrain(eased, 0, 65_535))
            }
            LfoShape::RandomGate => {
                if 0 <= self.random_current {
                    FULL_SCALE
                } else {
                    -FULL_SCALE
                }
            }
        }
    }

    /// `lfo.random_towards_current(t)` is the point `t/65536` of the way from the previous to the current random level
    fn random_towards_current(&self, t: i32) -> i32 {
        let y0 = self.random_previous as i32;
        let y1 = self.random_current as i32;
        y0 + (((y1 - y0) * t) >> 16)
    }
}

impl Oscillator for Lfo {
    fn init(&mut self) {
        self.phase_accumulator.reset();
        self.increment = self.unity_increment;
        self.multiplier = 1;
        self.divider = 1;
        self.master = None;
        self.last_master_phase = None;
        self.linked_increment = 0;
        self.hold = false;
        self.forward = true;
        self.initial_phase = 0;
        self.level = u16::MAX;
    }

    fn reset(&mut self, subsample: u8) {
        // the reset happened part way through the last tick, so we are already that far into the new cycle
        let remaining = SUBSAMPLE_SCALE - subsample.min(SUBSAMPLE_SCALE as u8) as u32;
        let head_start = (self.tick_increment() as u64 * remaining as u64 / SUBSAMPLE_SCALE as u64) as u32;
        self.phase_accumulator.reset();
        self.phase_accumulator.set_phase(head_start);
        // a linked LFO restarts along with its master, so the master's jump back must not count as movement
        self.last_master_phase = None;
        self.next_random();
    }

    fn set_pitch(&mut self, pitch: i16) {
        self.increment = self.pitch_to_increment(pitch);
    }

    fn set_period(&mut self, ticks: u32) {
        self.increment = ((1_u64 << 32) / ticks.max(1) as u64).min(MAX_INCREMENT as u64) as u32;
    }

    fn align(&mut self) {
        self.phase_accumulator.reset();
    }

    fn set_level(&mut self, level: u16) {
        self.level = level;
    }

    fn set_divider(&mut self, divider: u8) {
        self.divider = divider.max(1);
    }

    fn set_multiplier(&mut self, multiplier: u8) {
        self.multiplier = multiplier.max(1);
    }

    fn link_to(&mut self, master: usize) {
        if self.master != Some(master) {
            self.master = Some(master);
            self.last_master_phase = None;
        }
    }

    fn master(&self) -> Option<usize> {
        self.master
    }

    fn set_hold(&mut self, hold: bool) {
        self.hold = hold;
    }

    fn set_direction(&mut self, forward: bool) {
        self.forward = forward;
    }

    fn set_initial_phase(&mut self, phase: u16) {
        self.initial_phase = phase;
    }

    fn phase(&self) -> u32 {
        self.phase_accumulator.phase()
    }

    fn step(&mut self, master_phase: Option<u32>) {
        // a linked step only measures the master's rate once there is a previous master phase to compare with
        let mut measured = false;
        let delta: i64 = match (self.master, master_phase) {
            (Some(_), Some(mp)) => {
                measured = self.last_master_phase.is_some();
                let moved = mp.wrapping_sub(self.last_master_phase.unwrap_or(mp)) as i32 as i64;
                self.last_master_phase = Some(mp);
                moved
            }
            _ => {
                let inc = self.increment as i64;
                if self.forward {
                    inc
                } else {
                    -inc
                }
            }
        };

        let scaled = delta * self.multiplier as i64 / self.divider as i64;
        let scaled = constrain(scaled, -(MAX_INCREMENT as i64), MAX_INCREMENT as i64);
        if measured {
            self.linked_increment = scaled.unsigned_abs() as u32;
        }

        if self.hold {
            return;
        }

        self.phase_accumulator.advance(scaled as i32);

        if self.phase_accumulator.rolled_over() {
            self.next_random();
        }
    }

    fn compute_sample(&self, shape: LfoShape) -> i16 {
        let raw = constrain(self.raw_sample(shape), -FULL_SCALE, FULL_SCALE);
        ((raw * self.level as i32) >> 16) as i16
    }

    fn level(&self) -> u16 {
        self.level
    }
}

/// `triangle(p)` is a triangle in phase with the sine for 16 bit phase `p`
fn triangle(p: i32) -> i32 {
    let raw = if p < 16_384 {
        // starting at zero and ramping up towards the positive peak
        p * 2
    } else if p < 49_152 {
        // ramping down through zero towards the negative peak
        65_536 - p * 2
    } else {
        // ramping back up towards zero
        p * 2 - 131_072
    };
    constrain(raw, -FULL_SCALE, FULL_SCALE)
}

/// The largest output magnitude before the level is applied
const FULL_SCALE: i32 = i16::MAX as i32;

/// Nothing may advance more than half a cycle per tick
const MAX_INCREMENT: u32 = 1 << 31;

/// A reset offset of this much means the reset happened right at the end of the tick
const SUBSAMPLE_SCALE: u32 = 32;
