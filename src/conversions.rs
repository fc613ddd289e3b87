//! # Control conversions
//!
//! Pure functions mapping a gross control (usually a pot), a fine offset and an attenuated CV onto the parameters
//! the oscillators understand. Every result is clamped into the range its consumer accepts.
//!
//! Pitch is expressed in 1/128 semitone units, so one octave is [`OCTAVE`] units.

use crate::{lookup_tables::*, utils::*};

/// One octave in pitch units
pub const OCTAVE: i32 = 12 << 7;

/// `adc_values_to_pitch(c, f, cv)` is the pitch for coarse pot `c`, fine offset `f` and attenuated CV `cv`
///
/// The coarse pot goes through the pitch curve, full scale CV spans 5 octaves and full scale fine spans 1 octave.
pub fn adc_values_to_pitch(coarse: u16, fine: i16, cv: i16) -> i16 {
    let coarse = interpolate_88(&PITCH_TABLE, coarse) - 32_768;
    let fine = (OCTAVE * fine as i32) >> 16;
    let cv = (cv as i32 * 5 * OCTAVE) >> 15;
    constrain(coarse + fine + cv, i16::MIN as i32, i16::MAX as i32) as i16
}

/// `adc_values_to_divider(p, f, cv)` is a clock divider in `[1, 64]`
pub fn adc_values_to_divider(pot: u16, fine: i16, cv: i16) -> u8 {
    let div = DIVIDE_TABLE[stepped_index(pot, cv)] as i32 - fine_steps(fine) as i32;
    constrain(div, 1, 64) as u8
}

/// `adc_values_to_divider_multiplier(p, f, cv)` is a signed ratio, positive values divide, negative values multiply
///
/// The result is in `[1, 64]` or `[-64, -2]`.
pub fn adc_values_to_divider_multiplier(pot: u16, fine: i16, cv: i16) -> i8 {
    apply_fine_to_ratio(DIVIDE_MULTIPLY_TABLE[stepped_index(pot, cv)], fine_steps(fine))
}

/// `apply_fine_to_ratio(r, f)` is the signed ratio `r` nudged by `f` fine steps
///
/// Moving across the boundary between dividing and multiplying jumps over the degenerate values `0` and `-1`, so the
/// ratios run `... 2, 1, -2, -3 ...` in the positive direction and `... -3, -2, 1, 2 ...` in the negative one.
pub fn apply_fine_to_ratio(ratio: i8, fine: i8) -> i8 {
    let mut div = ratio as i32 - fine as i32;

    if fine > 1 {
        if div == 0 {
            div = -2;
        } else if div == -1 {
            div = -3;
        }
    } else if fine == 1 {
        if div == 0 {
            div = -2;
        }
    } else if fine < -1 && div == 0 {
        div = 2;
    }

    if div >= -1 {
        constrain(div, 1, 64) as i8
    } else {
        constrain(div, -64, -2) as i8
    }
}

/// `adc_values_to_phase(p, f, cv)` is an initial phase, the pot is inverted so that fully clockwise is zero phase
pub fn adc_values_to_phase(pot: u16, fine: i16, cv: i16) -> u16 {
    let inverted = 65_536 - pot as i32;
    let ctrl = constrain(inverted + cv as i32 + fine as i32 / 8, 0, u16::MAX as i32);
    interpolate_88(&PHASE_TABLE, ctrl as u16) as u16
}

/// `adc_values_to_level(p, f, cv)` is an output level, the bottom of the pot is a small dead zone
pub fn adc_values_to_level(pot: u16, fine: i16, cv: i16) -> u16 {
    let ctrl = constrain(pot as i32 + cv as i32 - 256 + fine as i32 / 4, 0, u16::MAX as i32);
    // the phase table is a straight line, so it works for levels too
    interpolate_88(&PHASE_TABLE, ctrl as u16) as u16
}

/// `fine_steps(f)` is the fine offset `f` reduced to a handful of whole steps in `[-3, 2]`
fn fine_steps(fine: i16) -> i8 {
    ((5 * (fine as i32 + i16::MAX as i32 / 5)) >> 16) as i8
}

/// `stepped_index(p, cv)` is the index into a 256 entry table for pot `p` offset by `cv`
fn stepped_index(pot: u16, cv: i16) -> usize {
    (constrain(pot as i32 + cv as i32, 0, u16::MAX as i32) >> 8) as usize
}
