//! # Signal routing engine
//!
//! Runs once per tick. Reads the [`Controls`] published by the UI along with the CV and reset inputs, converts them
//! into oscillator parameters, wires the four oscillators into the topology of the current feature mode, steps them
//! and derives the output samples.
//!
//! The topologies:
//!
//! - `Free`: four independent LFOs
//! - `Quad`: channel 0 is the master, channels 1 to 3 run at slower divisions of it and the outputs are mixed. The
//!   reset inputs of channels 1, 2 and 3 hold the master, reverse it and rotate the waveshapes
//! - `Phase`: channels 1 to 3 follow channel 0 at a phase offset
//! - `Divide`: channels 1 to 3 follow channel 0 at a divided or multiplied rate

use crate::{
    conversions::*,
    oscillator::{LfoShape, Oscillator},
    settings::{FeatureMode, WaveBank},
    snapshot::ChannelOutput,
    ui::{ChannelControls, Controls, UiMode},
    utils::constrain,
    NUM_CHANNELS,
};

/// A reset input edge detector with sub-sample timing is represented here
///
/// The detector arms when the input drops below [`RESET_THRESHOLD_LOW`] and triggers when it then rises above
/// [`RESET_THRESHOLD_HIGH`]. It stays armed until the consumer of the trigger disarms it, so a consumer that never
/// disarms sees the trigger on every tick the input stays high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetDetector {
    armed: bool,
    previous: i16,
    subsample: u8,
    triggered: bool,
}

impl ResetDetector {
    /// `ResetDetector::new()` is a new disarmed reset detector
    pub fn new() -> Self {
        Self::default()
    }

    /// `rd.detect(s)` updates the detector with the new reset sample `s`
    pub fn detect(&mut self, sample: i16) {
        if sample < RESET_THRESHOLD_LOW {
            self.armed = true;
        }

        self.triggered = self.armed && RESET_THRESHOLD_HIGH < sample;
        if self.triggered {
            // where between the previous sample and this one the input crossed the threshold, in 1/32 of a tick
            let to_threshold = RESET_THRESHOLD_HIGH as i32 - self.previous as i32;
            let to_sample = sample as i32 - self.previous as i32;
            self.subsample = if 0 < to_sample {
                constrain(to_threshold * 32 / to_sample, 0, 32) as u8
            } else {
                0
            };
        }

        self.previous = sample;
    }

    /// `rd.triggered()` is true iff the last sample triggered a reset
    pub fn triggered(&self) -> bool {
        self.triggered
    }

    /// `rd.armed()` is true iff the next rising edge will trigger
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// `rd.disarm()` consumes the trigger, nothing more triggers until the input drops low again
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// `rd.subsample()` is how far into the last tick the reset happened, in `[0, 32]`
    pub fn subsample(&self) -> u8 {
        self.subsample
    }
}

/// The signal routing engine is represented here
pub struct Processor<O: Oscillator> {
    lfos: [O; NUM_CHANNELS],
    previous_feature_mode: Option<FeatureMode>,

    filtered_cv: [i16; NUM_CHANNELS],
    resets: [ResetDetector; NUM_CHANNELS],

    // ticks since the last reset, the period in sync mode
    last_reset: [u32; NUM_CHANNELS],
    last_coarse: [u16; NUM_CHANNELS],
    synced: [bool; NUM_CHANNELS],

    waveform_offset: u8,
}

impl<O: Oscillator> Processor<O> {
    /// `Processor::new(lfos)` is a new engine driving the oscillators `lfos`, one per channel
    pub fn new(lfos: [O; NUM_CHANNELS]) -> Self {
        Self {
            lfos,
            previous_feature_mode: None,
            filtered_cv: [0; NUM_CHANNELS],
            resets: [ResetDetector::new(); NUM_CHANNELS],
            last_reset: [0; NUM_CHANNELS],
            last_coarse: [0; NUM_CHANNELS],
            synced: [false; NUM_CHANNELS],
            waveform_offset: 0,
        }
    }

    /// `p.process(c, cvs, resets)` runs one tick with controls `c` and the CV and reset samples of every channel
    ///
    /// Returns the output samples of every channel, or `None` while the UI plays its power up animation, in which case
    /// the oscillators are left untouched.
    pub fn process(
        &mut self,
        controls: &Controls,
        cvs: &[i16; NUM_CHANNELS],
        resets: &[i16; NUM_CHANNELS],
    ) -> Option<[ChannelOutput; NUM_CHANNELS]> {
        if controls.ui_mode == UiMode::Splash {
            return None;
        }

        let feature_mode = controls.feature_mode;
        if self.previous_feature_mode != Some(feature_mode) {
            #[cfg(feature = "defmt")]
            defmt::info!("reconfiguring for {}", feature_mode);
            for lfo in self.lfos.iter_mut() {
                lfo.init();
            }
            self.waveform_offset = 0;
            self.previous_feature_mode = Some(feature_mode);
        }

        for ch in 0..NUM_CHANNELS {
            if feature_mode != FeatureMode::Quad {
                self.lfos[ch].set_level(adc_values_to_level(controls.channels[ch].level, 0, 0));
            }
            let cv = self.filtered_cv[ch] as i32;
            self.filtered_cv[ch] = (cv + ((cvs[ch] as i32 - cv) >> 6)) as i16;
            self.resets[ch].detect(resets[ch]);
        }

        match feature_mode {
            FeatureMode::Free => self.configure_free(controls),
            FeatureMode::Quad => self.configure_quad(controls),
            FeatureMode::Phase => self.configure_phase(controls),
            FeatureMode::Divide => self.configure_divide(controls),
        }

        Some(self.render(controls))
    }

    /// `p.waveform_offset()` is how far the waveshapes have been rotated by the waveshape reset input
    pub fn waveform_offset(&self) -> u8 {
        self.waveform_offset
    }

    /// `p.reset_detector(ch)` is the reset detector of channel `ch`
    pub fn reset_detector(&self, ch: usize) -> &ResetDetector {
        &self.resets[ch]
    }

    /// `p.filtered_cv(ch)` is the smoothed CV of channel `ch`
    pub fn filtered_cv(&self, ch: usize) -> i16 {
        self.filtered_cv[ch]
    }

    /// `p.lfo(ch)` is the oscillator of channel `ch`
    pub fn lfo(&self, ch: usize) -> &O {
        &self.lfos[ch]
    }

    fn configure_free(&mut self, controls: &Controls) {
        for ch in 0..NUM_CHANNELS {
            self.set_frequency(ch, controls);
            self.lfos[ch].set_initial_phase(controls.channels[ch].phase);
        }
    }

    fn configure_quad(&mut self, controls: &Controls) {
        self.set_frequency(0, controls);
        let master = &controls.channels[0];
        self.lfos[0].set_initial_phase(master.phase);
        self.apply_transport_resets();
        self.lfos[0].set_level(adc_values_to_level(master.level, 0, 0));

        // the coarse pots and CVs of the slaves set their share of the mix, their level pots slow them down
        for ch in 1..NUM_CHANNELS {
            let c = &controls.channels[ch];
            let cv = self.attenuated_cv(ch, c);
            self.lfos[ch].set_level(adc_values_to_level(c.coarse, c.fine, cv));
            self.lfos[ch].link_to(0);
            let slowdown = (7 * (u16::MAX - c.level) as i32) >> 16;
            self.lfos[ch].set_divider(constrain(slowdown + ch as i32 + 1, 1, 16) as u8);
            self.lfos[ch].set_initial_phase(c.phase);
        }
    }

    fn configure_phase(&mut self, controls: &Controls) {
        self.set_frequency(0, controls);
        self.apply_transport_resets();

        let quadrature = controls.channels[1..]
            .iter()
            .all(|c| u16::MAX - QUADRATURE_POT_WINDOW < c.coarse);

        if quadrature {
            // exact quarter cycles need every follower at the master's rate
            for ch in 1..NUM_CHANNELS {
                self.lfos[ch].link_to(0);
                self.lfos[ch].set_divider(1);
                self.lfos[ch].set_initial_phase(((NUM_CHANNELS - ch) * 16_384) as u16);
            }
        } else {
            for ch in 1..NUM_CHANNELS {
                let c = &controls.channels[ch];
                let cv = self.attenuated_cv(ch, c);
                self.lfos[ch].link_to(0);
                self.lfos[ch].set_initial_phase(adc_values_to_phase(c.coarse, c.fine, cv));
                let slowdown = (7 * (u16::MAX - c.phase) as i32) >> 16;
                self.lfos[ch].set_divider(constrain(slowdown, 1, 16) as u8);
            }
        }
    }

    fn configure_divide(&mut self, controls: &Controls) {
        self.set_frequency(0, controls);
        self.lfos[0].set_initial_phase(controls.channels[0].phase);
        self.apply_transport_resets();

        let master_reset = (!controls.sync_mode && self.resets[0].triggered()).then(|| self.resets[0].subsample());

        for ch in 1..NUM_CHANNELS {
            let c = &controls.channels[ch];
            let cv = self.attenuated_cv(ch, c);
            let ratio = adc_values_to_divider_multiplier(c.coarse, c.fine, cv);

            let lfo = &mut self.lfos[ch];
            lfo.link_to(0);
            if 1 < ratio {
                lfo.set_multiplier(1);
                lfo.set_divider(ratio as u8);
            } else if ratio < -1 {
                lfo.set_multiplier(ratio.unsigned_abs());
                lfo.set_divider(1);
            } else {
                lfo.set_multiplier(1);
                lfo.set_divider(1);
            }
            lfo.set_initial_phase(c.phase);

            if let Some(subsample) = master_reset {
                lfo.reset(subsample);
            }
        }
    }

    /// `p.apply_transport_resets()` lets reset inputs 1, 2 and 3 hold the master, reverse it, and rotate the shapes
    ///
    /// Hold and direction follow the level of their input while it stays triggered, the rotation fires once per edge.
    fn apply_transport_resets(&mut self) {
        self.lfos[0].set_hold(self.resets[1].triggered());
        self.lfos[0].set_direction(!self.resets[2].triggered());

        if self.resets[3].triggered() {
            self.waveform_offset = self.waveform_offset.wrapping_add(1);
            self.resets[3].disarm();
        }
    }

    /// `p.set_frequency(ch, c)` sets the rate of channel `ch` from its controls, CV and reset input
    fn set_frequency(&mut self, ch: usize, controls: &Controls) {
        let c = &controls.channels[ch];
        let cv = self.attenuated_cv(ch, c);
        let lfo = &mut self.lfos[ch];

        if controls.sync_mode {
            // the CV picks a whole ratio of the clock
            let steps = (cv.unsigned_abs() as u32 * SYNC_CV_STEPS / i16::MAX as u32) as u8 + 1;
            if 0 < cv {
                lfo.set_multiplier(steps);
                lfo.set_divider(1);
            } else {
                lfo.set_multiplier(1);
                lfo.set_divider(steps);
            }
        }

        // counted before the reset check, so resets N ticks apart measure a period of N
        self.last_reset[ch] = self.last_reset[ch].saturating_add(1);

        let reset = &mut self.resets[ch];
        if reset.triggered() {
            if controls.sync_mode {
                lfo.set_period(self.last_reset[ch]);
                lfo.align();
                self.synced[ch] = true;
            } else {
                lfo.reset(reset.subsample());
            }
            reset.disarm();
            self.last_reset[ch] = 0;
        }

        if !self.synced[ch] || UNSYNC_POT_THRESHOLD <= c.coarse.abs_diff(self.last_coarse[ch]) {
            lfo.set_pitch(adc_values_to_pitch(c.coarse, c.fine, cv));
            self.last_coarse[ch] = c.coarse;
            self.synced[ch] = false;
        }
    }

    /// `p.attenuated_cv(ch, c)` is the smoothed CV of channel `ch` scaled by its attenuation setting
    fn attenuated_cv(&self, ch: usize, c: &ChannelControls) -> i16 {
        ((self.filtered_cv[ch] as i32 * c.atten as i32) >> 16) as i16
    }

    /// `p.shape_for(c, fm)` is the shape rendered on the shaped output of a channel with controls `c` in feature mode `fm`
    fn shape_for(&self, c: &ChannelControls, feature_mode: FeatureMode) -> LfoShape {
        let shape = match c.bank {
            WaveBank::Classic => LfoShape::classic(c.shape.wrapping_add(self.waveform_offset)),
            WaveBank::Random => LfoShape::random(c.random_waveform_index.wrapping_add(self.waveform_offset)),
        };

        match (feature_mode, shape) {
            (FeatureMode::Quad, LfoShape::Trapezoid) => LfoShape::Square,
            _ => shape,
        }
    }

    /// `p.render(c)` steps every oscillator once and is the output of every channel
    ///
    /// The channels are stepped from the highest to the lowest. In quad mode each output is the mix of its own
    /// channel and every channel above it, normalized by their total gain.
    fn render(&mut self, controls: &Controls) -> [ChannelOutput; NUM_CHANNELS] {
        let quad = controls.feature_mode == FeatureMode::Quad;
        let mut outputs = [ChannelOutput::default(); NUM_CHANNELS];

        let mut sine = 0_i32;
        let mut shaped = 0_i32;
        let mut gain = 0_i32;

        for ch in (0..NUM_CHANNELS).rev() {
            let shape = self.shape_for(&controls.channels[ch], controls.feature_mode);

            let master_phase = self.lfos[ch]
                .master()
                .filter(|&m| m != ch && m < NUM_CHANNELS)
                .map(|m| self.lfos[m].phase());
            let lfo = &mut self.lfos[ch];
            lfo.step(master_phase);

            if !quad {
                sine = 0;
                shaped = 0;
                gain = 0;
            }
            sine += lfo.compute_sample(LfoShape::Sine) as i32;
            shaped += lfo.compute_sample(shape) as i32;
            gain += lfo.level() as i32;

            outputs[ch] = if quad {
                let gain = gain.max(u16::MAX as i32);
                ChannelOutput {
                    sine: normalize(sine, gain),
                    shaped: normalize(shaped, gain),
                }
            } else {
                ChannelOutput {
                    sine: sine as i16,
                    shaped: shaped as i16,
                }
            };
        }

        outputs
    }
}

/// `normalize(s, g)` is the mixed sample `s` scaled back to full scale by the total gain `g`
fn normalize(sum: i32, gain: i32) -> i16 {
    constrain(((sum << 13) / gain) << 3, i16::MIN as i32, i16::MAX as i32) as i16
}

/// A reset input below this arms the reset detector
pub const RESET_THRESHOLD_LOW: i16 = 10_000;

/// A reset input above this triggers an armed reset detector
pub const RESET_THRESHOLD_HIGH: i16 = 20_000;

/// Once synced to a clock, the coarse pot must move this far to take over the rate again
pub const UNSYNC_POT_THRESHOLD: u16 = (i16::MAX / 20) as u16;

/// In sync mode a full scale CV multiplies or divides the clock by this much more
const SYNC_CV_STEPS: u32 = 8;

/// The coarse pots of channels 1 to 3 all within this of the top select exact quadrature
const QUADRATURE_POT_WINDOW: u16 = 256;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lfo::Lfo;

    const SAMPLE_RATE: u32 = 1_000;

    fn processor() -> Processor<Lfo> {
        Processor::new(Lfo::bank(SAMPLE_RATE))
    }

    /// An LFO which remembers the ratio and phase it was last given, and how often its pitch was set
    struct RecordingLfo {
        lfo: Lfo,
        multiplier: u8,
        divider: u8,
        initial_phase: u16,
        pitch_updates: u32,
    }

    impl Oscillator for RecordingLfo {
        fn init(&mut self) {
            self.multiplier = 1;
            self.divider = 1;
            self.initial_phase = 0;
            self.lfo.init();
        }
        fn reset(&mut self, subsample: u8) {
            self.lfo.reset(subsample);
        }
        fn set_pitch(&mut self, pitch: i16) {
            self.pitch_updates += 1;
            self.lfo.set_pitch(pitch);
        }
        fn set_period(&mut self, ticks: u32) {
            self.lfo.set_period(ticks);
        }
        fn align(&mut self) {
            self.lfo.align();
        }
        fn set_level(&mut self, level: u16) {
            self.lfo.set_level(level);
        }
        fn set_divider(&mut self, divider: u8) {
            self.divider = divider;
            self.lfo.set_divider(divider);
        }
        fn set_multiplier(&mut self, multiplier: u8) {
            self.multiplier = multiplier;
            self.lfo.set_multiplier(multiplier);
        }
        fn link_to(&mut self, master: usize) {
            self.lfo.link_to(master);
        }
        fn master(&self) -> Option<usize> {
            self.lfo.master()
        }
        fn set_hold(&mut self, hold: bool) {
            self.lfo.set_hold(hold);
        }
        fn set_direction(&mut self, forward: bool) {
            self.lfo.set_direction(forward);
        }
        fn set_initial_phase(&mut self, phase: u16) {
            self.initial_phase = phase;
            self.lfo.set_initial_phase(phase);
        }
        fn phase(&self) -> u32 {
            self.lfo.phase()
        }
        fn step(&mut self, master_phase: Option<u32>) {
            self.lfo.step(master_phase);
        }
        fn compute_sample(&self, shape: LfoShape) -> i16 {
            self.lfo.compute_sample(shape)
        }
        fn level(&self) -> u16 {
            self.lfo.level()
        }
    }

    fn recording_processor() -> Processor<RecordingLfo> {
        Processor::new(Lfo::bank(SAMPLE_RATE).map(|lfo| RecordingLfo {
            lfo,
            multiplier: 1,
            divider: 1,
            initial_phase: 0,
            pitch_updates: 0,
        }))
    }

    fn ratio(p: &Processor<RecordingLfo>, ch: usize) -> (u8, u8) {
        (p.lfo(ch).multiplier, p.lfo(ch).divider)
    }

    fn controls(feature_mode: FeatureMode) -> Controls {
        let mut controls = Controls {
            feature_mode,
            ..Default::default()
        };
        for c in controls.channels.iter_mut() {
            c.coarse = 32_768;
            c.fine = 0;
        }
        controls
    }

    #[test]
    fn reset_detector_needs_arming() {
        let mut rd = ResetDetector::new();
        rd.detect(30_000);
        assert!(!rd.triggered());

        rd.detect(0);
        assert!(rd.armed());
        rd.detect(30_000);
        assert!(rd.triggered());
    }

    #[test]
    fn reset_detector_interpolates_the_crossing() {
        let mut rd = ResetDetector::new();
        rd.detect(0);
        rd.detect(20_000);
        assert!(!rd.triggered());

        let mut rd = ResetDetector::new();
        rd.detect(0);
        rd.detect(30_000);
        // (20000 - 0) * 32 / 30000
        assert_eq!(rd.subsample(), 21);

        let mut rd = ResetDetector::new();
        rd.detect(-10_000);
        rd.detect(30_000);
        assert_eq!(rd.subsample(), 24);
    }

    #[test]
    fn reset_detector_stays_triggered_until_disarmed() {
        let mut rd = ResetDetector::new();
        rd.detect(0);
        rd.detect(30_000);
        rd.detect(30_000);
        assert!(rd.triggered());

        rd.disarm();
        rd.detect(30_000);
        assert!(!rd.triggered());
    }

    #[test]
    fn nothing_happens_during_splash() {
        let mut p = processor();
        let c = Controls {
            ui_mode: UiMode::Splash,
            ..controls(FeatureMode::Free)
        };
        for _ in 0..10 {
            assert_eq!(p.process(&c, &[0; 4], &[0; 4]), None);
        }
        assert!(p.lfos.iter().all(|lfo| lfo.phase() == 0));
    }

    #[test]
    fn free_channels_run_independently() {
        let mut p = processor();
        let mut c = controls(FeatureMode::Free);
        c.channels[2].coarse = u16::MAX;
        p.process(&c, &[0; 4], &[0; 4]);

        assert_eq!(p.lfo(0).increment(), p.lfo(1).increment());
        assert!(p.lfo(0).increment() < p.lfo(2).increment());
        assert!(p.lfos.iter().all(|lfo| lfo.master().is_none()));
    }

    #[test]
    fn quad_waveform_offset_advances_once_per_edge() {
        let mut p = processor();
        let c = controls(FeatureMode::Quad);
        let low = [0; 4];
        let high = [0, 0, 0, 30_000];

        p.process(&c, &[0; 4], &low);
        assert!(p.reset_detector(3).armed());

        p.process(&c, &[0; 4], &high);
        assert_eq!(p.waveform_offset(), 1);
        assert!(!p.reset_detector(3).armed());

        // staying high does nothing more
        for _ in 0..10 {
            p.process(&c, &[0; 4], &high);
        }
        assert_eq!(p.waveform_offset(), 1);

        p.process(&c, &[0; 4], &low);
        p.process(&c, &[0; 4], &high);
        assert_eq!(p.waveform_offset(), 2);
    }

    #[test]
    fn quad_reset_inputs_hold_and_reverse_the_master() {
        let mut p = processor();
        let c = controls(FeatureMode::Quad);
        p.process(&c, &[0; 4], &[0; 4]);

        let held = [0, 30_000, 0, 0];
        p.process(&c, &[0; 4], &held);
        let phase = p.lfo(0).phase();
        for _ in 0..5 {
            p.process(&c, &[0; 4], &held);
        }
        assert_eq!(p.lfo(0).phase(), phase);

        p.process(&c, &[0; 4], &[0; 4]);
        let phase = p.lfo(0).phase();
        p.process(&c, &[0; 4], &[0, 0, 30_000, 0]);
        assert!(p.lfo(0).phase() < phase);
    }

    #[test]
    fn quad_links_and_divides_the_slaves() {
        let mut p = processor();
        let c = controls(FeatureMode::Quad);
        p.process(&c, &[0; 4], &[0; 4]);
        for ch in 1..4 {
            assert_eq!(p.lfo(ch).master(), Some(0));
        }
    }

    #[test]
    fn quad_mix_is_normalized_by_the_total_gain() {
        let mut p = processor();
        let c = controls(FeatureMode::Quad);
        let mut peak = 0;
        for _ in 0..2_000 {
            if let Some(outputs) = p.process(&c, &[0; 4], &[0; 4]) {
                assert!(i16::MIN < outputs[0].sine);
                peak = peak.max(outputs[0].sine.unsigned_abs());
            }
        }
        assert!(8_000 < peak);
    }

    #[test]
    fn normalize_floors_the_gain_at_full_scale() {
        assert_eq!(normalize(0, u16::MAX as i32), 0);
        assert_eq!(normalize(16_384, u16::MAX as i32), 16_384);
        assert_eq!(normalize(4 * 32_000, 4 * u16::MAX as i32), 32_000);
    }

    #[test]
    fn changing_feature_mode_reinitializes() {
        let mut p = processor();
        let quad = controls(FeatureMode::Quad);
        p.process(&quad, &[0; 4], &[0; 4]);
        p.process(&quad, &[0; 4], &[0, 0, 0, 30_000]);
        assert_eq!(p.waveform_offset(), 1);

        p.process(&controls(FeatureMode::Free), &[0; 4], &[0; 4]);
        assert_eq!(p.waveform_offset(), 0);
        assert!(p.lfos.iter().all(|lfo| lfo.master().is_none()));
    }

    #[test]
    fn phase_mode_forces_quadrature_with_pots_at_the_top() {
        let mut p = processor();
        let mut c = controls(FeatureMode::Phase);
        for ch in 1..4 {
            c.channels[ch].coarse = u16::MAX;
        }
        p.process(&c, &[0; 4], &[0; 4]);

        // with the same phase, the sines are a quarter cycle apart
        let outputs = p.process(&c, &[0; 4], &[0; 4]).unwrap_or_default();
        assert!(outputs[2].sine.abs() < 1_000);
        assert!(outputs[3].sine > 32_000);
        assert!(outputs[1].sine < -32_000);
    }

    #[test]
    fn divide_mode_reset_resyncs_the_slaves() {
        let mut p = processor();
        let c = controls(FeatureMode::Divide);
        for _ in 0..100 {
            p.process(&c, &[0; 4], &[0; 4]);
        }
        assert!(0 < p.lfo(1).phase());

        p.process(&c, &[0; 4], &[30_000, 0, 0, 0]);
        assert!(p.lfo(1).phase() < p.lfo(1).increment());
    }

    #[test]
    fn random_bank_ignores_the_panel_shape() {
        let p = processor();
        let mut c = controls(FeatureMode::Free).channels[0];
        c.bank = WaveBank::Random;
        c.random_waveform_index = 2;
        c.shape = 3;
        assert_eq!(p.shape_for(&c, FeatureMode::Free), LfoShape::RandomSmooth);
    }

    #[test]
    fn quad_mode_swaps_trapezoid_for_square() {
        let p = processor();
        let c = controls(FeatureMode::Quad).channels[0];
        assert_eq!(p.shape_for(&c, FeatureMode::Free), LfoShape::Trapezoid);
        assert_eq!(p.shape_for(&c, FeatureMode::Quad), LfoShape::Square);
    }

    #[test]
    fn sync_mode_clocks_the_period_from_resets() {
        let mut p = processor();
        let c = Controls {
            sync_mode: true,
            ..controls(FeatureMode::Free)
        };

        let mut resets = [0; 4];
        for t in 0..300 {
            resets[0] = if t % 100 == 0 { 30_000 } else { 0 };
            p.process(&c, &[0; 4], &resets);
        }

        // the increment of a 100 tick period
        assert_eq!(p.lfo(0).increment(), ((1_u64 << 32) / 100) as u32);
        assert!(p.synced[0]);
    }

    #[test]
    fn sync_mode_cv_picks_a_whole_ratio() {
        let mut p = recording_processor();
        let c = Controls {
            sync_mode: true,
            ..controls(FeatureMode::Free)
        };
        for _ in 0..1_000 {
            p.process(&c, &[i16::MAX, i16::MIN, 0, 0], &[0; 4]);
        }

        // full scale CV is 8 steps of the clock away from unity
        assert_eq!(ratio(&p, 0), (8, 1));
        assert_eq!(ratio(&p, 1), (1, 9));
        assert_eq!(ratio(&p, 2), (1, 1));
    }

    #[test]
    fn synced_pitch_ignores_small_coarse_moves() {
        let mut p = recording_processor();
        let mut c = Controls {
            sync_mode: true,
            ..controls(FeatureMode::Free)
        };

        let mut resets = [0; 4];
        for t in 0..300 {
            resets[0] = if t % 100 == 0 { 30_000 } else { 0 };
            p.process(&c, &[0; 4], &resets);
        }
        assert!(p.synced[0]);
        let updates = p.lfo(0).pitch_updates;

        c.channels[0].coarse = 32_768 + UNSYNC_POT_THRESHOLD - 1;
        for _ in 0..10 {
            p.process(&c, &[0; 4], &[0; 4]);
        }
        assert_eq!(p.lfo(0).pitch_updates, updates);
        assert_eq!(p.lfo(0).lfo.increment(), ((1_u64 << 32) / 100) as u32);

        c.channels[0].coarse = 32_768 + UNSYNC_POT_THRESHOLD;
        p.process(&c, &[0; 4], &[0; 4]);
        assert_eq!(p.lfo(0).pitch_updates, updates + 1);
        assert!(!p.synced[0]);
    }

    #[test]
    fn quad_level_pots_slow_the_slaves_down() {
        let mut p = recording_processor();
        let mut c = controls(FeatureMode::Quad);
        c.channels[1].level = u16::MAX;
        c.channels[2].level = 0;
        c.channels[3].level = 32_768;
        p.process(&c, &[0; 4], &[0; 4]);

        // divided by their position plus up to 6 more from the level pot
        assert_eq!(ratio(&p, 1), (1, 2));
        assert_eq!(ratio(&p, 2), (1, 9));
        assert_eq!(ratio(&p, 3), (1, 7));
    }

    #[test]
    fn phase_mode_offsets_and_divides_from_the_pots() {
        let mut p = recording_processor();
        let mut c = controls(FeatureMode::Phase);
        c.channels[1].phase = u16::MAX;
        c.channels[2].phase = 0;
        c.channels[3].coarse = 10_000;
        p.process(&c, &[0; 4], &[0; 4]);

        assert_eq!(p.lfo(1).initial_phase, adc_values_to_phase(32_768, 0, 0));
        assert_eq!(p.lfo(3).initial_phase, adc_values_to_phase(10_000, 0, 0));
        assert_eq!(ratio(&p, 1), (1, 1));
        assert_eq!(ratio(&p, 2), (1, 6));
        for ch in 1..4 {
            assert_eq!(p.lfo(ch).master(), Some(0));
        }
    }

    #[test]
    fn divide_mode_ratio_sign_picks_divider_or_multiplier() {
        let mut p = recording_processor();
        let mut c = controls(FeatureMode::Divide);
        c.channels[1].coarse = 110 << 8;
        c.channels[2].coarse = 140 << 8;
        c.channels[3].coarse = 128 << 8;
        assert_eq!(adc_values_to_divider_multiplier(110 << 8, 0, 0), 2);
        assert_eq!(adc_values_to_divider_multiplier(140 << 8, 0, 0), -2);
        assert_eq!(adc_values_to_divider_multiplier(128 << 8, 0, 0), 1);

        p.process(&c, &[0; 4], &[0; 4]);
        assert_eq!(ratio(&p, 1), (1, 2));
        assert_eq!(ratio(&p, 2), (2, 1));
        assert_eq!(ratio(&p, 3), (1, 1));
    }

    #[test]
    fn divide_mode_reset_keeps_the_slaves_aligned_with_the_master() {
        let mut p = processor();
        let mut c = controls(FeatureMode::Divide);
        c.channels[0].coarse = 50_000;
        for _ in 0..100 {
            p.process(&c, &[0; 4], &[0; 4]);
        }
        let offset = p.lfo(0).phase().wrapping_sub(p.lfo(1).phase());

        // the reset lands part way through the tick
        p.process(&c, &[0; 4], &[30_000, 0, 0, 0]);
        assert_eq!(p.reset_detector(0).subsample(), 21);
        assert_eq!(p.lfo(0).phase().wrapping_sub(p.lfo(1).phase()), offset);

        for _ in 0..10 {
            p.process(&c, &[0; 4], &[0; 4]);
        }
        assert_eq!(p.lfo(0).phase().wrapping_sub(p.lfo(1).phase()), offset);
    }
}
