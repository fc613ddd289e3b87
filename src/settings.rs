//! # Persisted settings
//!
//! The settings which survive a power cycle, and their exact byte image in non-volatile storage.
//!
//! The image is a packed little endian record of [`SETTINGS_SIZE`] bytes:
//!
//! | offset | size | field                    |
//! |--------|------|--------------------------|
//! | 0      | 1    | feature mode             |
//! | 1      | 4    | wave bank per channel    |
//! | 5      | 4    | random waveform index    |
//! | 9      | 8    | fine pots                |
//! | 17     | 8    | phase pots               |
//! | 25     | 8    | level pots               |
//! | 33     | 8    | attenuation pots         |
//! | 41     | 3    | padding, always zero     |

use crate::NUM_CHANNELS;

/// The channel coupling topologies are represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeatureMode {
    /// Four independent LFOs
    Free,
    /// Channel 0 drives three divided channels whose outputs are mixed
    Quad,
    /// Channels 1 to 3 follow channel 0 at a phase offset
    Phase,
    /// Channels 1 to 3 follow channel 0 at a divided or multiplied rate
    Divide,
}

impl FeatureMode {
    /// `fm.next()` is the feature mode after `fm`, wrapping around
    pub fn next(self) -> Self {
        match self {
            FeatureMode::Free => FeatureMode::Quad,
            FeatureMode::Quad => FeatureMode::Phase,
            FeatureMode::Phase => FeatureMode::Divide,
            FeatureMode::Divide => FeatureMode::Free,
        }
    }

    /// `fm.index()` is the position of the mode on the front panel LEDs
    pub fn index(self) -> usize {
        self as usize
    }

    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(FeatureMode::Free),
            1 => Some(FeatureMode::Quad),
            2 => Some(FeatureMode::Phase),
            3 => Some(FeatureMode::Divide),
            _ => None,
        }
    }
}

/// The per-channel waveform banks are represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveBank {
    /// The panel switches choose among the classic shapes
    Classic,
    /// A fixed random shape chosen in the random waveform select mode
    Random,
}

impl WaveBank {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(WaveBank::Classic),
            1 => Some(WaveBank::Random),
            _ => None,
        }
    }
}

/// Settings that persist across power cycles are represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedSettings {
    pub feature_mode: FeatureMode,
    pub bank: [WaveBank; NUM_CHANNELS],
    /// in `[0..3]`
    pub random_waveform_index: [u8; NUM_CHANNELS],
    pub fine: [u16; NUM_CHANNELS],
    pub phase: [u16; NUM_CHANNELS],
    pub level: [u16; NUM_CHANNELS],
    pub atten: [u16; NUM_CHANNELS],
}

impl Default for PersistedSettings {
    /// `PersistedSettings::default()` is free mode, classic banks, and every zoom pot at its neutral position
    fn default() -> Self {
        let mut settings = Self {
            feature_mode: FeatureMode::Free,
            bank: [WaveBank::Classic; NUM_CHANNELS],
            random_waveform_index: [0; NUM_CHANNELS],
            fine: [0; NUM_CHANNELS],
            phase: [0; NUM_CHANNELS],
            level: [0; NUM_CHANNELS],
            atten: [0; NUM_CHANNELS],
        };
        settings.clear_zoom();
        settings
    }
}

impl PersistedSettings {
    /// `s.clear_zoom()` returns the fine, phase, level and attenuation pots of every channel to neutral
    ///
    /// Fine goes to its center, the others go fully open.
    pub fn clear_zoom(&mut self) {
        self.fine = [u16::MAX / 2; NUM_CHANNELS];
        self.phase = [u16::MAX; NUM_CHANNELS];
        self.level = [u16::MAX; NUM_CHANNELS];
        self.atten = [u16::MAX; NUM_CHANNELS];
    }

    /// `s.clear_all()` returns every setting to its default
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// `s.to_bytes()` is the storage image of the settings
    pub fn to_bytes(&self) -> [u8; SETTINGS_SIZE] {
        let mut image = [0; SETTINGS_SIZE];
        image[0] = self.feature_mode as u8;

        for ch in 0..NUM_CHANNELS {
            image[1 + ch] = self.bank[ch] as u8;
            image[5 + ch] = self.random_waveform_index[ch];
        }

        let words = [self.fine, self.phase, self.level, self.atten];
        for (group, values) in words.iter().enumerate() {
            for (ch, v) in values.iter().enumerate() {
                let at = WORDS_OFFSET + (group * NUM_CHANNELS + ch) * 2;
                image[at..at + 2].copy_from_slice(&v.to_le_bytes());
            }
        }

        image
    }

    /// `PersistedSettings::from_bytes(b)` is the settings stored in image `b`, or `None` if `b` is not a valid image
    pub fn from_bytes(image: &[u8]) -> Option<Self> {
        if image.len() != SETTINGS_SIZE {
            return None;
        }

        let mut settings = Self::default();
        settings.feature_mode = FeatureMode::from_byte(image[0])?;

        for ch in 0..NUM_CHANNELS {
            settings.bank[ch] = WaveBank::from_byte(image[1 + ch])?;
            let idx = image[5 + ch];
            if NUM_RANDOM_WAVEFORMS <= idx as usize {
                return None;
            }
            settings.random_waveform_index[ch] = idx;
        }

        let mut words = [[0_u16; NUM_CHANNELS]; 4];
        for (group, values) in words.iter_mut().enumerate() {
            for (ch, v) in values.iter_mut().enumerate() {
                let at = WORDS_OFFSET + (group * NUM_CHANNELS + ch) * 2;
                *v = u16::from_le_bytes([image[at], image[at + 1]]);
            }
        }
        let [fine, phase, level, atten] = words;
        settings.fine = fine;
        settings.phase = phase;
        settings.level = level;
        settings.atten = atten;

        Some(settings)
    }
}

/// The size in bytes of the settings image
pub const SETTINGS_SIZE: usize = 44;

/// The number of waveforms in the random bank
pub const NUM_RANDOM_WAVEFORMS: usize = 4;

/// Byte offset of the first 16 bit pot value in the image
const WORDS_OFFSET: usize = 9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_modes_cycle() {
        let mut fm = FeatureMode::Free;
        let expected = [FeatureMode::Quad, FeatureMode::Phase, FeatureMode::Divide, FeatureMode::Free];
        for e in expected {
            fm = fm.next();
            assert_eq!(fm, e);
        }
    }

    #[test]
    fn defaults_are_neutral() {
        let s = PersistedSettings::default();
        assert_eq!(s.feature_mode, FeatureMode::Free);
        assert_eq!(s.bank, [WaveBank::Classic; 4]);
        assert_eq!(s.fine, [32_767; 4]);
        assert_eq!(s.phase, [u16::MAX; 4]);
        assert_eq!(s.level, [u16::MAX; 4]);
        assert_eq!(s.atten, [u16::MAX; 4]);
    }

    #[test]
    fn image_layout_is_packed_little_endian() {
        let mut s = PersistedSettings::default();
        s.feature_mode = FeatureMode::Divide;
        s.bank[2] = WaveBank::Random;
        s.random_waveform_index[2] = 3;
        s.fine[0] = 0x1234;
        s.phase[1] = 0xABCD;
        s.atten[3] = 0x0102;

        let image = s.to_bytes();
        assert_eq!(image[0], 3);
        assert_eq!(&image[1..5], &[0, 0, 1, 0]);
        assert_eq!(&image[5..9], &[0, 0, 3, 0]);
        assert_eq!(&image[9..11], &[0x34, 0x12]);
        assert_eq!(&image[19..21], &[0xCD, 0xAB]);
        assert_eq!(&image[39..41], &[0x02, 0x01]);
        assert_eq!(&image[41..], &[0, 0, 0]);
    }

    #[test]
    fn image_reads_back() {
        let mut s = PersistedSettings::default();
        s.feature_mode = FeatureMode::Phase;
        s.bank = [WaveBank::Random, WaveBank::Classic, WaveBank::Random, WaveBank::Classic];
        s.random_waveform_index = [1, 0, 2, 0];
        s.level = [1, 2, 3, 4];

        assert_eq!(PersistedSettings::from_bytes(&s.to_bytes()), Some(s));
    }

    #[test]
    fn garbage_images_are_rejected() {
        let mut image = PersistedSettings::default().to_bytes();
        image[0] = 7;
        assert_eq!(PersistedSettings::from_bytes(&image), None);

        let mut image = PersistedSettings::default().to_bytes();
        image[6] = 4;
        assert_eq!(PersistedSettings::from_bytes(&image), None);

        assert_eq!(PersistedSettings::from_bytes(&[0; SETTINGS_SIZE - 1]), None);
    }
}
