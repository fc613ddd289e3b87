//! Structures used to pass the state of the hardware peripherals in and out of the core.

use crate::NUM_CHANNELS;

/// The raw state of every input, sampled once per tick.
///
/// `InputSnapshot` is meant to be filled by the hardware binding. It should pass pretty raw data, with one exception:
/// switch levels are expected to be electrically debounced already.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot {
    /// Pot readings, full scale is `u16::MAX`
    pub pots: [u16; NUM_CHANNELS],
    /// Bipolar CV readings
    pub cvs: [i16; NUM_CHANNELS],
    /// Reset input readings
    pub resets: [i16; NUM_CHANNELS],
    pub sync: bool,
    pub wav1: bool,
    pub wav2: bool,
    pub select: bool,
}

/// The pair of samples written to the DAC for one channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelOutput {
    /// The sine output
    pub sine: i16,
    /// The output with the selected waveshape
    pub shaped: i16,
}

/// Everything the core writes back to the hardware after one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// `None` while the outputs are not being driven, during the startup animation
    pub outputs: Option<[ChannelOutput; NUM_CHANNELS]>,
    pub leds: [bool; NUM_CHANNELS],
}
