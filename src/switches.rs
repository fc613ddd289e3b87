//! # Press gesture detection
//!
//! A momentary button may be tapped or held. Holding it walks through a series of stages, and crossing each stage
//! threshold fires exactly one event while the button is still down:
//!
//! - released before [`LONG_PRESS_MS`]: one release event carrying the press duration
//! - held past [`LONG_PRESS_MS`]: a long press event
//! - held past [`VERY_LONG_PRESS_MS`]: a very long press event
//! - held past [`CLEAR_SETTINGS_PRESS_MS`]: a clear settings event, after which nothing more fires until release
//!
//! Releasing the button after any of the long stages fires nothing, the stage event already did the work.
//!
//! The switch levels are expected to be debounced by the caller.

use crate::events::{Event, Switch};

/// The stage of a press gesture is represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressState {
    /// The button is up
    Idle,
    /// The button went down at `since`, no threshold crossed yet
    Pressed { since: u32 },
    /// The long press fired, waiting for the very long threshold
    Long { since: u32 },
    /// The very long press fired, waiting for the clear settings threshold
    VeryLong { since: u32 },
    /// Every threshold fired, waiting for the button to come up
    ClearPending,
}

/// A press gesture detector for a single button
pub struct PressDetector {
    switch: Switch,
    state: PressState,
    was_pressed: bool,
}

impl PressDetector {
    /// `PressDetector::new(s)` is a new press detector for switch `s`
    pub fn new(switch: Switch) -> Self {
        Self {
            switch,
            state: PressState::Idle,
            was_pressed: false,
        }
    }

    /// `pd.poll(p, t)` updates the detector with the debounced level `p` sampled at time `t` milliseconds
    ///
    /// Returns the event fired by this poll, if any. At most one event fires per poll.
    pub fn poll(&mut self, pressed: bool, now_ms: u32) -> Option<Event> {
        let just_pressed = pressed && !self.was_pressed;
        let just_released = !pressed && self.was_pressed;
        self.was_pressed = pressed;

        if just_pressed {
            self.state = PressState::Pressed { since: now_ms };
            return Some(Event::SwitchPressed(self.switch));
        }

        if just_released {
            let event = match self.state {
                PressState::Pressed { since } => Some(self.released(now_ms.wrapping_sub(since))),
                // the stage events already fired
                PressState::Long { .. } | PressState::VeryLong { .. } | PressState::ClearPending => None,
                PressState::Idle => None,
            };
            self.state = PressState::Idle;
            return event;
        }

        if !pressed {
            return None;
        }

        let (next, threshold, since) = match self.state {
            PressState::Pressed { since } => (PressState::Long { since }, LONG_PRESS_MS, since),
            PressState::Long { since } => (PressState::VeryLong { since }, VERY_LONG_PRESS_MS, since),
            PressState::VeryLong { since } => (PressState::ClearPending, CLEAR_SETTINGS_PRESS_MS, since),
            PressState::Idle | PressState::ClearPending => return None,
        };

        let held_ms = now_ms.wrapping_sub(since);
        if threshold < held_ms {
            self.state = next;
            Some(self.released(held_ms))
        } else {
            None
        }
    }

    /// `pd.state()` is the current stage of the gesture
    pub fn state(&self) -> PressState {
        self.state
    }

    /// `pd.is_pressed()` is true iff the button was down at the last poll
    pub fn is_pressed(&self) -> bool {
        self.was_pressed
    }

    fn released(&self, duration_ms: u32) -> Event {
        Event::SwitchReleased {
            switch: self.switch,
            duration_ms,
        }
    }
}

/// Holding the button longer than this is a long press
pub const LONG_PRESS_MS: u32 = 500;

/// Holding the button longer than this is a very long press
pub const VERY_LONG_PRESS_MS: u32 = 2_000;

/// Holding the button longer than this clears all settings
pub const CLEAR_SETTINGS_PRESS_MS: u32 = 4_000;
