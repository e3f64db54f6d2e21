//! Blink scheduling.
//!
//! At most one blinker per output port. A blinker starts in the off phase
//! with its first toggle due immediately, so the first `advance` at or after
//! its start switches the port on. Blinkers only ever add bits to the
//! digital output; an expired blinker is dropped and contributes nothing.

use plcbox_common::board::DigitalOutputs;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// One active blinker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blinker {
    /// Instant at which the blinker expires. `None` if beyond the clock's range.
    pub end_time: Option<Instant>,
    /// Time between phase toggles.
    pub interval: Duration,
    /// Instant of the next phase toggle. `None` if beyond the clock's range.
    pub next_toggle: Option<Instant>,
    /// Current phase.
    pub phase_on: bool,
}

impl Blinker {
    fn new(interval: Duration, duration: Duration, now: Instant) -> Self {
        Self {
            end_time: now.checked_add(duration),
            interval,
            next_toggle: Some(now),
            phase_on: false,
        }
    }
}

#[inline]
fn reached(now: Instant, deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|t| now >= t)
}

/// Owner of all active blinkers of one engine run.
#[derive(Debug, Clone, Default)]
pub struct BlinkScheduler {
    blinkers: BTreeMap<u8, Blinker>,
}

impl BlinkScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or restart the blinker of `port`.
    pub fn start(&mut self, port: u8, interval: Duration, duration: Duration, now: Instant) {
        self.blinkers
            .insert(port, Blinker::new(interval, duration, now));
    }

    /// Expire, toggle and overlay all blinkers onto `digital`.
    pub fn advance(&mut self, now: Instant, digital: DigitalOutputs) -> DigitalOutputs {
        self.blinkers.retain(|_, b| !reached(now, b.end_time));

        let mut out = digital;
        for (&port, blinker) in self.blinkers.iter_mut() {
            if reached(now, blinker.next_toggle) {
                blinker.phase_on = !blinker.phase_on;
                blinker.next_toggle = now.checked_add(blinker.interval);
            }
            if blinker.phase_on {
                out.insert(DigitalOutputs::port(port));
            }
        }
        out
    }

    /// The blinker of `port`, if active.
    pub fn get(&self, port: u8) -> Option<&Blinker> {
        self.blinkers.get(&port)
    }

    /// Number of active blinkers.
    pub fn len(&self) -> usize {
        self.blinkers.len()
    }

    /// True if no blinker is active.
    pub fn is_empty(&self) -> bool {
        self.blinkers.is_empty()
    }
}
