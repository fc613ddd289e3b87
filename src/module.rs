//! # The whole module
//!
//! [`QuadLfo`] ties the front panel, the signal routing engine and the settings storage together. The hardware
//! binding calls [`QuadLfo::init`] once with the first input snapshot, then [`QuadLfo::tick`] once per control tick,
//! writing the returned [`Frame`] to the DACs and LEDs.
//!
//! Each tick runs in a fixed order: the inputs are conditioned into events, every event is handled, and only then
//! does the engine run, so it always sees the effect of everything that happened during the tick.

use crate::{
    oscillator::Oscillator,
    processor::Processor,
    snapshot::{Frame, InputSnapshot},
    storage::Storage,
    ui::Ui,
    NUM_CHANNELS,
};

/// A four channel LFO module is represented here
pub struct QuadLfo<O: Oscillator, S: Storage> {
    ui: Ui,
    processor: Processor<O>,
    storage: S,
}

impl<O: Oscillator, S: Storage> QuadLfo<O, S> {
    /// `QuadLfo::new(lfos, s)` is a new module driving the oscillators `lfos` and keeping its settings in storage `s`
    pub fn new(lfos: [O; NUM_CHANNELS], storage: S) -> Self {
        Self {
            ui: Ui::new(),
            processor: Processor::new(lfos),
            storage,
        }
    }

    /// `m.init(i)` loads the stored settings and synchronizes the pots to the first input snapshot `i`
    pub fn init(&mut self, inputs: &InputSnapshot) {
        self.ui.init(&mut self.storage, &inputs.pots);
    }

    /// `m.tick(i, t)` runs one control tick with inputs `i` sampled at time `t` milliseconds
    pub fn tick(&mut self, inputs: &InputSnapshot, now_ms: u32) -> Frame {
        self.ui.poll(inputs, now_ms);
        self.ui.do_events(&mut self.storage, now_ms);

        let controls = self.ui.controls();
        let outputs = self.processor.process(&controls, &inputs.cvs, &inputs.resets);

        Frame {
            outputs,
            leds: self.ui.leds(),
        }
    }

    /// `m.ui()` is the front panel of the module
    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    /// `m.processor()` is the signal routing engine of the module
    pub fn processor(&self) -> &Processor<O> {
        &self.processor
    }

    /// `m.storage()` is where the module keeps its settings
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
