//! # Control events
//!
//! The input conditioner turns raw switch and pot readings into semantic events, the UI drains them once per tick.
//! The queue is bounded, when it is full new events are dropped.

use heapless::Deque;

/// The front panel switches are represented here
///
/// Only `Select` is a momentary button with press gestures, the others are read as plain levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    Sync,
    Wav1,
    Wav2,
    Select,
}

/// A single control event is represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The switch went down
    SwitchPressed(Switch),

    /// The switch was released, or was held long enough to cross one of the long press thresholds
    SwitchReleased { switch: Switch, duration_ms: u32 },

    /// A pot moved far enough to commit a new value
    PotChanged { pot: u8, value: u16 },
}

/// A bounded FIFO of events which also tracks how long it has been since anything happened
pub struct EventQueue {
    events: Deque<Event, QUEUE_CAPACITY>,
    last_event_ms: u32,
}

impl EventQueue {
    /// `EventQueue::new()` is a new empty event queue
    pub fn new() -> Self {
        Self {
            events: Deque::new(),
            last_event_ms: 0,
        }
    }

    /// `q.add_event(e, t)` queues event `e` which happened at time `t` milliseconds
    ///
    /// If the queue is full the event is dropped.
    pub fn add_event(&mut self, event: Event, now_ms: u32) {
        if self.events.push_back(event).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("event queue full, dropping {}", event);
        }
        self.last_event_ms = now_ms;
    }

    /// `q.pull_event()` is the oldest queued event, if there is one
    pub fn pull_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// `q.available()` is true iff there are events waiting
    pub fn available(&self) -> bool {
        !self.events.is_empty()
    }

    /// `q.len()` is the number of events waiting
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `q.is_empty()` is true iff no events are waiting
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// `q.idle_time(t)` is the number of milliseconds between the last event or touch and time `t`
    pub fn idle_time(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_event_ms)
    }

    /// `q.touch(t)` restarts the idle timer at time `t` without queueing anything
    pub fn touch(&mut self, now_ms: u32) {
        self.last_event_ms = now_ms;
    }

    /// `q.flush()` discards every waiting event
    pub fn flush(&mut self) {
        self.events.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The maximum number of events which may wait in the queue
pub const QUEUE_CAPACITY: usize = 32;

/// After this many milliseconds without events the queue is touched to restart its idle timer
pub const IDLE_TIMEOUT_MS: u32 = 500;
