//! # Front panel user interface
//!
//! The UI owns everything the player can set: the committed coarse pots, the zoom pots (fine, level, attenuation
//! and phase per channel), the wave banks and the feature mode. It runs the input conditioner once per tick, drains
//! the resulting events, and publishes a read-only [`Controls`] snapshot for the signal routing engine.
//!
//! The interface has five modes:
//!
//! - `Splash` plays a short LED chase at power up and then hands over to `Normal`
//! - `Normal` maps the four pots to the four coarse rates, a tap on Select cycles the feature mode
//! - `Zoom` maps the four pots to the fine, level, attenuation and phase of the last touched channel
//! - `SplashForRandomWaveformSelect` blinks the LEDs to announce `RandomWaveformSelect`
//! - `RandomWaveformSelect` maps each pot to the wave bank of its channel
//!
//! Leaving `Zoom` or `RandomWaveformSelect` puts every channel whose pot has moved away from its stored rate into
//! catch-up. A channel in catch-up ignores its pot until the pot is brought back near the stored value, so the rate
//! never jumps.

use crate::{
    events::{Event, EventQueue, Switch, IDLE_TIMEOUT_MS},
    pots::*,
    settings::{FeatureMode, PersistedSettings, WaveBank, SETTINGS_SIZE},
    snapshot::InputSnapshot,
    storage::Storage,
    switches::{PressDetector, CLEAR_SETTINGS_PRESS_MS, LONG_PRESS_MS, VERY_LONG_PRESS_MS},
    NUM_CHANNELS,
};

/// The modes of the front panel are represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiMode {
    Splash,
    Normal,
    Zoom,
    RandomWaveformSelect,
    SplashForRandomWaveformSelect,
}

/// The per-channel part of the [`Controls`] snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelControls {
    pub coarse: u16,
    /// centered on zero
    pub fine: i16,
    pub phase: u16,
    pub level: u16,
    pub atten: u16,
    pub bank: WaveBank,
    /// the classic shape, in `[0..3]`
    pub shape: u8,
    /// the random shape, in `[0..3]`
    pub random_waveform_index: u8,
}

impl Default for ChannelControls {
    fn default() -> Self {
        Self {
            coarse: 0,
            fine: 0,
            phase: u16::MAX,
            level: u16::MAX,
            atten: u16::MAX,
            bank: WaveBank::Classic,
            shape: 0,
            random_waveform_index: 0,
        }
    }
}

/// Everything the signal routing engine reads from the UI in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Controls {
    pub ui_mode: UiMode,
    pub feature_mode: FeatureMode,
    pub sync_mode: bool,
    pub channels: [ChannelControls; NUM_CHANNELS],
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            ui_mode: UiMode::Normal,
            feature_mode: FeatureMode::Free,
            sync_mode: false,
            channels: [ChannelControls::default(); NUM_CHANNELS],
        }
    }
}

/// The front panel user interface is represented here
pub struct Ui {
    mode: UiMode,
    settings: PersistedSettings,
    version_token: u16,

    select: PressDetector,
    pots: [PotFilter; NUM_CHANNELS],
    queue: EventQueue,

    coarse: [u16; NUM_CHANNELS],
    catchup: [bool; NUM_CHANNELS],
    classic_waveform_override: [Option<u8>; NUM_CHANNELS],
    last_touched_pot: usize,

    sync: bool,
    wav1: bool,
    wav2: bool,

    animation_counter: u32,
    leds: [bool; NUM_CHANNELS],
}

impl Ui {
    /// `Ui::new()` is a new UI in the splash mode with default settings
    pub fn new() -> Self {
        Self {
            mode: UiMode::Splash,
            settings: PersistedSettings::default(),
            version_token: 0,
            select: PressDetector::new(Switch::Select),
            pots: [PotFilter::new(0); NUM_CHANNELS],
            queue: EventQueue::new(),
            coarse: [0; NUM_CHANNELS],
            catchup: [false; NUM_CHANNELS],
            classic_waveform_override: [None; NUM_CHANNELS],
            last_touched_pot: 0,
            sync: false,
            wav1: false,
            wav2: false,
            animation_counter: 0,
            leds: [false; NUM_CHANNELS],
        }
    }

    /// `ui.init(s, p)` loads the settings from storage `s` and synchronizes the pots to the readings `p`
    ///
    /// If nothing valid is stored the defaults are used.
    pub fn init<S: Storage>(&mut self, storage: &mut S, pots: &[u16; NUM_CHANNELS]) {
        self.mode = UiMode::Splash;
        self.animation_counter = 0;
        self.load(storage);

        for (ch, &raw) in pots.iter().enumerate() {
            self.pots[ch] = PotFilter::new(raw);
            self.coarse[ch] = raw;
            self.catchup[ch] = false;
        }
        self.queue.flush();
    }

    /// `ui.poll(i, t)` conditions the inputs `i` sampled at time `t` milliseconds and refreshes the LEDs
    pub fn poll(&mut self, inputs: &InputSnapshot, now_ms: u32) {
        self.sync = inputs.sync;
        self.wav1 = inputs.wav1;
        self.wav2 = inputs.wav2;

        if let Some(event) = self.select.poll(inputs.select, now_ms) {
            self.queue.add_event(event, now_ms);
        }

        let threshold = self.pot_move_threshold();
        for (ch, pot) in self.pots.iter_mut().enumerate() {
            if let Some(value) = pot.poll(inputs.pots[ch], threshold) {
                let event = Event::PotChanged {
                    pot: ch as u8,
                    value,
                };
                self.queue.add_event(event, now_ms);
            }
        }

        self.paint_leds();
    }

    /// `ui.do_events(s, t)` handles every queued event, saving to storage `s` when the settings change
    pub fn do_events<S: Storage>(&mut self, storage: &mut S, now_ms: u32) {
        while let Some(event) = self.queue.pull_event() {
            match event {
                Event::SwitchReleased {
                    switch: Switch::Select,
                    duration_ms,
                } => self.on_select_released(duration_ms, storage),
                Event::PotChanged { pot, value } => self.on_pot_changed(pot as usize, value),
                Event::SwitchPressed(_) | Event::SwitchReleased { .. } => (),
            }
        }

        if IDLE_TIMEOUT_MS < self.queue.idle_time(now_ms) {
            self.queue.touch(now_ms);
        }
    }

    /// `ui.controls()` is the snapshot of everything the signal routing engine needs
    pub fn controls(&self) -> Controls {
        Controls {
            ui_mode: self.mode,
            feature_mode: self.settings.feature_mode,
            sync_mode: self.sync_mode(),
            channels: core::array::from_fn(|ch| ChannelControls {
                coarse: self.coarse[ch],
                fine: self.fine(ch),
                phase: self.settings.phase[ch],
                level: self.settings.level[ch],
                atten: self.settings.atten[ch],
                bank: self.settings.bank[ch],
                shape: self.shape_for(ch),
                random_waveform_index: self.settings.random_waveform_index[ch],
            }),
        }
    }

    /// `ui.mode()` is the current UI mode
    pub fn mode(&self) -> UiMode {
        self.mode
    }

    /// `ui.feature_mode()` is the selected feature mode
    pub fn feature_mode(&self) -> FeatureMode {
        self.settings.feature_mode
    }

    /// `ui.settings()` is the settings as they would be saved right now
    pub fn settings(&self) -> &PersistedSettings {
        &self.settings
    }

    /// `ui.coarse(ch)` is the committed coarse value of channel `ch`
    pub fn coarse(&self, ch: usize) -> u16 {
        self.coarse[ch]
    }

    /// `ui.fine(ch)` is the fine value of channel `ch`, centered on zero
    pub fn fine(&self, ch: usize) -> i16 {
        (self.settings.fine[ch] as i32 - 32_768) as i16
    }

    /// `ui.phase(ch)` is the initial phase setting of channel `ch`
    pub fn phase(&self, ch: usize) -> u16 {
        self.settings.phase[ch]
    }

    /// `ui.level(ch)` is the level setting of channel `ch`
    pub fn level(&self, ch: usize) -> u16 {
        self.settings.level[ch]
    }

    /// `ui.atten(ch)` is the CV attenuation setting of channel `ch`
    pub fn atten(&self, ch: usize) -> u16 {
        self.settings.atten[ch]
    }

    /// `ui.bank(ch)` is the waveshape bank of channel `ch`
    pub fn bank(&self, ch: usize) -> WaveBank {
        self.settings.bank[ch]
    }

    /// `ui.random_waveform_index(ch)` is the random shape of channel `ch`, used when its bank is random
    pub fn random_waveform_index(&self, ch: usize) -> u8 {
        self.settings.random_waveform_index[ch]
    }

    /// `ui.shape()` is the classic shape selected by the panel switches
    pub fn shape(&self) -> u8 {
        ((self.wav2 as u8) << 1) | self.wav1 as u8
    }

    /// `ui.shape_for(ch)` is the classic shape of channel `ch`, its override if it has one, else the panel shape
    pub fn shape_for(&self, ch: usize) -> u8 {
        self.classic_waveform_override[ch].unwrap_or_else(|| self.shape())
    }

    /// `ui.set_classic_waveform_override(ch, s)` pins channel `ch` to classic shape `s`, `None` follows the panel
    pub fn set_classic_waveform_override(&mut self, ch: usize, shape: Option<u8>) {
        self.classic_waveform_override[ch] = shape.map(|s| s % 4);
    }

    /// `ui.sync_mode()` is true iff the sync switch is on
    pub fn sync_mode(&self) -> bool {
        self.sync
    }

    /// `ui.catchup(ch)` is true iff channel `ch` is waiting for its pot to come back to the stored value
    pub fn catchup(&self, ch: usize) -> bool {
        self.catchup[ch]
    }

    /// `ui.last_touched_pot()` is the pot that moved most recently
    pub fn last_touched_pot(&self) -> usize {
        self.last_touched_pot
    }

    /// `ui.leds()` is the LED state painted by the last poll
    pub fn leds(&self) -> [bool; NUM_CHANNELS] {
        self.leds
    }

    /// `ui.flush_events()` drops every pending event
    pub fn flush_events(&mut self) {
        self.queue.flush();
    }

    fn set_mode(&mut self, mode: UiMode) {
        if self.mode != mode {
            #[cfg(feature = "defmt")]
            defmt::info!("ui mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// `ui.pot_move_threshold()` is how far a pot must move to commit, coarser in the modes with fewer steps
    fn pot_move_threshold(&self) -> u16 {
        match self.mode {
            UiMode::Zoom => POT_MOVE_THRESHOLD_ZOOM,
            UiMode::RandomWaveformSelect => POT_MOVE_THRESHOLD_RANDOM_WAVEFORM_SELECT,
            UiMode::Splash | UiMode::Normal | UiMode::SplashForRandomWaveformSelect => POT_MOVE_THRESHOLD,
        }
    }

    fn on_select_released<S: Storage>(&mut self, duration_ms: u32, storage: &mut S) {
        if CLEAR_SETTINGS_PRESS_MS < duration_ms {
            self.settings.clear_all();
            self.classic_waveform_override = [None; NUM_CHANNELS];
            self.save(storage);
            self.animation_counter = 0;
            self.set_mode(UiMode::Splash);
        } else if VERY_LONG_PRESS_MS < duration_ms {
            match self.mode {
                UiMode::Normal | UiMode::Zoom => {
                    self.animation_counter = 0;
                    self.set_mode(UiMode::SplashForRandomWaveformSelect);
                }
                UiMode::Splash | UiMode::RandomWaveformSelect | UiMode::SplashForRandomWaveformSelect => (),
            }
        } else if LONG_PRESS_MS < duration_ms {
            match self.mode {
                UiMode::Normal => self.set_mode(UiMode::Zoom),
                UiMode::Zoom => self.goto_normal_with_catchup_and_saving(storage),
                UiMode::Splash | UiMode::RandomWaveformSelect | UiMode::SplashForRandomWaveformSelect => (),
            }
        } else {
            match self.mode {
                UiMode::Normal => {
                    self.settings.feature_mode = self.settings.feature_mode.next();
                    self.settings.clear_zoom();
                    #[cfg(feature = "defmt")]
                    defmt::info!("feature mode {}", self.settings.feature_mode);
                    self.save(storage);
                }
                UiMode::Zoom | UiMode::RandomWaveformSelect => self.goto_normal_with_catchup_and_saving(storage),
                UiMode::Splash | UiMode::SplashForRandomWaveformSelect => (),
            }
        }
    }

    fn on_pot_changed(&mut self, pot: usize, value: u16) {
        if NUM_CHANNELS <= pot {
            return;
        }

        match self.mode {
            UiMode::Normal => {
                self.last_touched_pot = pot;
                if !self.catchup[pot] {
                    self.coarse[pot] = value;
                } else if self.coarse[pot].abs_diff(value) < CATCHUP_THRESHOLD {
                    self.coarse[pot] = value;
                    self.catchup[pot] = false;
                }
            }
            UiMode::Zoom => {
                let ch = self.last_touched_pot;
                match pot {
                    0 => self.settings.fine[ch] = value,
                    1 => self.settings.level[ch] = value,
                    2 => self.settings.atten[ch] = value,
                    _ => self.settings.phase[ch] = value,
                }
            }
            UiMode::RandomWaveformSelect => self.select_random_waveform(pot, value),
            UiMode::Splash | UiMode::SplashForRandomWaveformSelect => (),
        }
    }

    /// `ui.select_random_waveform(ch, v)` picks the wave bank of channel `ch` from pot value `v`
    ///
    /// The lowest bracket is the classic bank, each bracket above it is the next random shape.
    fn select_random_waveform(&mut self, ch: usize, value: u16) {
        let bracket = RANDOM_WAVEFORM_THRESHOLDS
            .iter()
            .position(|&t| value < t)
            .unwrap_or(RANDOM_WAVEFORM_THRESHOLDS.len());

        if bracket == 0 {
            self.settings.bank[ch] = WaveBank::Classic;
            self.settings.random_waveform_index[ch] = 0;
        } else {
            self.settings.bank[ch] = WaveBank::Random;
            self.settings.random_waveform_index[ch] = (bracket - 1) as u8;
        }
    }

    fn goto_normal_with_catchup_and_saving<S: Storage>(&mut self, storage: &mut S) {
        for ch in 0..NUM_CHANNELS {
            if CATCHUP_THRESHOLD < self.pots[ch].committed().abs_diff(self.coarse[ch]) {
                self.catchup[ch] = true;
            }
        }
        self.save(storage);
        self.set_mode(UiMode::Normal);
    }

    fn load<S: Storage>(&mut self, storage: &mut S) {
        let mut image = [0; SETTINGS_SIZE];
        let loaded = storage
            .load(&mut image, &mut self.version_token)
            .ok()
            .and_then(|_| PersistedSettings::from_bytes(&image));

        match loaded {
            Some(settings) => self.settings = settings,
            None => {
                #[cfg(feature = "defmt")]
                defmt::info!("no stored settings, using defaults");
                self.settings = PersistedSettings::default();
            }
        }
    }

    fn save<S: Storage>(&mut self, storage: &mut S) {
        let image = self.settings.to_bytes();
        if let Err(_e) = storage.save(&image, &mut self.version_token) {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to save settings: {}", _e);
        }
    }

    fn paint_leds(&mut self) {
        let counter = self.animation_counter;

        match self.mode {
            UiMode::Splash => {
                if counter % SPLASH_STEP_FRAMES == 0 {
                    let lit = (counter / SPLASH_STEP_FRAMES) as usize;
                    for (i, led) in self.leds.iter_mut().enumerate() {
                        *led = i == lit % NUM_CHANNELS;
                    }
                    if NUM_CHANNELS - 1 < lit {
                        self.set_mode(UiMode::Normal);
                    }
                }
                self.animation_counter += 1;
            }
            UiMode::Normal => {
                self.animation_counter = counter.wrapping_add(1);
                let counter = self.animation_counter;
                let flash = counter & 64 != 0 && counter & 32 != 0 && counter & 16 != 0;
                let selected = self.settings.feature_mode.index();
                for (i, led) in self.leds.iter_mut().enumerate() {
                    let on = i == selected;
                    *led = if self.catchup[i] { on != flash } else { on };
                }
            }
            UiMode::Zoom => {
                self.animation_counter = counter.wrapping_add(1);
                let blink = self.animation_counter & 128 != 0;
                for (i, led) in self.leds.iter_mut().enumerate() {
                    *led = i == self.last_touched_pot && blink;
                }
            }
            UiMode::RandomWaveformSelect => {
                // a bar that grows with the selected random shape, every channel pulsing in step
                let gate = counter & 0x80 == 0;
                let bar = ((counter / 256) % 4) as u8;
                for (i, led) in self.leds.iter_mut().enumerate() {
                    *led = gate
                        && self.settings.bank[i] == WaveBank::Random
                        && bar <= self.settings.random_waveform_index[i];
                }
                self.animation_counter = counter.wrapping_add(1);
            }
            UiMode::SplashForRandomWaveformSelect => {
                if counter % RWS_SPLASH_STEP_FRAMES == 0 {
                    let on = (counter / RWS_SPLASH_STEP_FRAMES) % 2 == 0;
                    self.leds = [on; NUM_CHANNELS];
                }
                self.animation_counter += 1;
                if RWS_SPLASH_FRAMES <= self.animation_counter {
                    self.animation_counter = 0;
                    self.set_mode(UiMode::RandomWaveformSelect);
                }
            }
        }
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

/// A pot further than this from its stored value puts the channel into catch-up
pub const CATCHUP_THRESHOLD: u16 = 1 << 10;

/// Upper bounds of the classic bank and the first three random shapes in the random waveform select mode
pub const RANDOM_WAVEFORM_THRESHOLDS: [u16; 4] = [9_500, 26_214, 42_312, 60_000];

/// Frames each LED stays lit during the power up chase
const SPLASH_STEP_FRAMES: u32 = 64;

/// Frames between LED toggles while announcing the random waveform select mode
const RWS_SPLASH_STEP_FRAMES: u32 = 100;

/// Length of the announcement before the random waveform select mode starts
const RWS_SPLASH_FRAMES: u32 = 399;
