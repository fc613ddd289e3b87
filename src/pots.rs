//! # Pot filtering
//!
//! Raw pot readings are noisy. Each reading is smoothed with a single pole lowpass, and a new value is only committed
//! once the smoothed value has moved at least a threshold away from the last committed value. This keeps a resting
//! pot from flooding the event queue, and the threshold can be made coarser when less resolution is needed.

/// A hysteretic pot filter is represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PotFilter {
    filtered: u16,
    committed: u16,
}

impl PotFilter {
    /// `PotFilter::new(v)` is a new pot filter resting at value `v`
    pub fn new(value: u16) -> Self {
        Self {
            filtered: value,
            committed: value,
        }
    }

    /// `pf.poll(raw, th)` filters the new reading `raw`, and is the newly committed value if it moved at least `th`
    pub fn poll(&mut self, raw: u16, threshold: u16) -> Option<u16> {
        let value = (31 * self.filtered as u32 + raw as u32) >> 5;
        self.filtered = value as u16;

        let distance = (value as i32 - self.committed as i32).unsigned_abs();
        if threshold as u32 <= distance {
            self.committed = self.filtered;
            Some(self.committed)
        } else {
            None
        }
    }

    /// `pf.filtered()` is the current smoothed value
    pub fn filtered(&self) -> u16 {
        self.filtered
    }

    /// `pf.committed()` is the last committed value
    pub fn committed(&self) -> u16 {
        self.committed
    }
}

/// The usual move threshold, 8 bits of resolution
pub const POT_MOVE_THRESHOLD: u16 = 1 << (16 - 8);

/// Move threshold while zoomed in on a channel, 6 bits of resolution
pub const POT_MOVE_THRESHOLD_ZOOM: u16 = 1 << (16 - 6);

/// Move threshold while choosing random waveforms, 5 bits of resolution
pub const POT_MOVE_THRESHOLD_RANDOM_WAVEFORM_SELECT: u16 = 1 << (16 - 5);
