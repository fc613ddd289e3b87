//! Fixed point lookup tables
//!
//! All tables are computed at compile time. Tables meant for `interpolate_88` have 257 entries so that the
//! interpolation always has a right hand neighbor, tables indexed directly by the top 8 bits of a control have 256.

/// The size of the tables which are interpolated with 8 index bits and 8 fraction bits
pub const INTERPOLATED_LUT_SIZE: usize = 257;

/// The size of the tables which are indexed directly by the top 8 bits of a 16 bit control
pub const STEPPED_LUT_SIZE: usize = 256;

/// Coarse pot to pitch, bipolar around 32768
///
/// The curve is a cubic so that the middle of the pot has finer resolution than the extremes.
pub const PITCH_TABLE: [u16; INTERPOLATED_LUT_SIZE] = build_pitch_table();

/// Pot to a positive integer divider, slowest at the bottom of the pot
pub const DIVIDE_TABLE: [u8; STEPPED_LUT_SIZE] = build_divide_table();

/// Pot to a signed ratio, positive values divide and negative values multiply
///
/// The values `0` and `-1` never appear, they would be degenerate ratios.
pub const DIVIDE_MULTIPLY_TABLE: [i8; STEPPED_LUT_SIZE] = build_divide_multiply_table();

/// Straight line from 0 to full scale, shared by the phase and level conversions
pub const PHASE_TABLE: [u16; INTERPOLATED_LUT_SIZE] = build_phase_table();

/// One full cycle of a sine wave, the last entry wraps back around to the first
pub const SINE_TABLE: [i16; INTERPOLATED_LUT_SIZE] = build_sine_table();

/// `2^(k/12)` for each semitone of one octave, as 16.16 fixed point
pub const SEMITONE_RATIO_TABLE: [u32; 13] = [
    65536, 69433, 73562, 77936, 82570, 87480, 92682, 98193, 104032, 110218, 116772, 123715, 131072,
];

const fn build_pitch_table() -> [u16; INTERPOLATED_LUT_SIZE] {
    let mut table = [0; INTERPOLATED_LUT_SIZE];
    let mut i = 0;
    while i < INTERPOLATED_LUT_SIZE {
        let d = i as i64 - 128;
        // d * (1 + 3d^2) shaped, reaches 8_388_608 at the ends
        let curve = d * (16_384 + 3 * d * d);
        table[i] = (32_768 + curve * PITCH_SPAN / 8_388_608) as u16;
        i += 1;
    }
    table
}

const fn build_divide_table() -> [u8; STEPPED_LUT_SIZE] {
    let mut table = [0; STEPPED_LUT_SIZE];
    let mut i = 0;
    while i < STEPPED_LUT_SIZE {
        table[i] = DIVIDE_STEPS[i * DIVIDE_STEPS.len() / STEPPED_LUT_SIZE];
        i += 1;
    }
    table
}

const fn build_divide_multiply_table() -> [i8; STEPPED_LUT_SIZE] {
    let mut table = [0; STEPPED_LUT_SIZE];
    let mut i = 0;
    while i < STEPPED_LUT_SIZE {
        table[i] = DIVIDE_MULTIPLY_STEPS[i * DIVIDE_MULTIPLY_STEPS.len() / STEPPED_LUT_SIZE];
        i += 1;
    }
    table
}

const fn build_phase_table() -> [u16; INTERPOLATED_LUT_SIZE] {
    let mut table = [0; INTERPOLATED_LUT_SIZE];
    let mut i = 0;
    while i < INTERPOLATED_LUT_SIZE {
        let v = i as u32 * 256;
        table[i] = if v > u16::MAX as u32 { u16::MAX } else { v as u16 };
        i += 1;
    }
    table
}

// Bhaskara's approximation, each half cycle is computed separately and the second one is negated
const fn build_sine_table() -> [i16; INTERPOLATED_LUT_SIZE] {
    let mut table = [0; INTERPOLATED_LUT_SIZE];
    let mut i = 0;
    while i < INTERPOLATED_LUT_SIZE {
        let j = (i % 128) as i64;
        let j = if i == 256 { 128 } else { j };
        let u = j * (128 - j);
        let magnitude = 32_767 * 16 * u / (5 * 16_384 - 4 * u);
        table[i] = if i < 128 { magnitude as i16 } else { -magnitude as i16 };
        i += 1;
    }
    table
}

/// The pitch table spans this many pitch units either side of center, 8 octaves
const PITCH_SPAN: i64 = 8 * 1536;

const DIVIDE_STEPS: [u8; 14] = [64, 48, 32, 24, 16, 12, 8, 7, 6, 5, 4, 3, 2, 1];

const DIVIDE_MULTIPLY_STEPS: [i8; 19] = [64, 32, 16, 8, 6, 5, 4, 3, 2, 1, -2, -3, -4, -5, -6, -8, -16, -32, -64];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_table_is_centered_and_monotonic() {
        assert_eq!(PITCH_TABLE[128], 32_768);
        assert_eq!(PITCH_TABLE[0], 32_768 - 12_288);
        assert_eq!(PITCH_TABLE[256], 32_768 + 12_288);
        assert!(PITCH_TABLE.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn divide_multiply_table_never_holds_degenerate_ratios() {
        assert!(DIVIDE_MULTIPLY_TABLE.iter().all(|&d| d != 0 && d != -1));
        assert_eq!(DIVIDE_MULTIPLY_TABLE[128], 1);
    }

    #[test]
    fn divide_table_runs_from_slow_to_unity() {
        assert_eq!(DIVIDE_TABLE[0], 64);
        assert_eq!(DIVIDE_TABLE[255], 1);
    }

    #[test]
    fn phase_table_is_linear() {
        assert_eq!(PHASE_TABLE[0], 0);
        assert_eq!(PHASE_TABLE[100], 25_600);
        assert_eq!(PHASE_TABLE[256], u16::MAX);
    }

    #[test]
    fn sine_table_hits_the_peaks() {
        assert_eq!(SINE_TABLE[0], 0);
        assert_eq!(SINE_TABLE[64], 32_767);
        assert_eq!(SINE_TABLE[128], 0);
        assert_eq!(SINE_TABLE[192], -32_767);
        assert_eq!(SINE_TABLE[256], 0);
    }
}
