#![no_std]
#![doc = include_str!("../README.md")]

pub mod conversions;
pub mod events;
pub mod lfo;
pub mod module;
pub mod oscillator;
pub mod pots;
pub mod processor;
pub mod settings;
pub mod snapshot;
pub mod storage;
pub mod switches;
pub mod ui;

mod lookup_tables;
mod phase_accumulator;
mod rng;
mod utils;

/// The number of LFO channels on the module
pub const NUM_CHANNELS: usize = 4;
