//! Operational events emitted by the engine.
//!
//! The engine never formats log lines itself; it hands an [`EngineEvent`] to
//! an [`EventSink`]. [`TracingSink`] is the production sink, forwarding to
//! `tracing`. [`RecordingSink`] keeps events in memory for inspection.

use crate::delay::TimerId;
use parking_lot::Mutex;
use plcbox_common::board::BoardError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Something the engine did that an operator may want to see.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The control loop entered Running.
    Started {
        /// Board the engine drives.
        board_id: u8,
        /// Number of loaded rules.
        rule_count: usize,
    },
    /// The control loop finished its shutdown cleanup.
    Stopped {
        /// Board the engine drove.
        board_id: u8,
        /// Cycles executed in the run.
        cycles: u64,
    },
    /// A rule became true this cycle.
    RuleTriggered {
        /// Rule name.
        name: String,
    },
    /// A blinker was started or restarted.
    BlinkStarted {
        /// Output port.
        port: u8,
        /// Phase toggle period.
        interval: Duration,
        /// Total blink time.
        duration: Duration,
    },
    /// A delayed action set was scheduled.
    TimerStarted {
        /// Timer id.
        id: TimerId,
        /// Delay until firing.
        delay: Duration,
    },
    /// A delayed action set fired.
    TimerFired {
        /// Timer id.
        id: TimerId,
    },
    /// The board failed; the run is over.
    BoardLost {
        /// Board that failed.
        board_id: u8,
        /// Failure reported by the driver.
        error: BoardError,
    },
}

impl EngineEvent {
    /// True for events that end a run abnormally.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::BoardLost { .. })
    }
}

/// Receiver of engine events.
///
/// Called synchronously from the control loop; implementations must not block.
pub trait EventSink: Send + Sync {
    /// Handle one event.
    fn emit(&self, event: &EngineEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &EngineEvent) {
        match event {
            EngineEvent::Started {
                board_id,
                rule_count,
            } => info!("Engine started on board {board_id} with {rule_count} rules"),
            EngineEvent::Stopped { board_id, cycles } => {
                info!("Engine stopped on board {board_id} after {cycles} cycles")
            }
            EngineEvent::RuleTriggered { name } => info!("Rule triggered: {name}"),
            EngineEvent::BlinkStarted {
                port,
                interval,
                duration,
            } => debug!(
                "Blink started on output {port} (interval {:.3}s, duration {:.3}s)",
                interval.as_secs_f64(),
                duration.as_secs_f64()
            ),
            EngineEvent::TimerStarted { id, delay } => {
                debug!("Timer {} started ({:.3}s)", id.0, delay.as_secs_f64())
            }
            EngineEvent::TimerFired { id } => debug!("Timer {} fired", id.0),
            EngineEvent::BoardLost { board_id, error } => {
                error!("CRITICAL: board {board_id} lost: {error}")
            }
        }
    }
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events so far.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().clone()
    }

    /// Number of events matching `pred`.
    pub fn count(&self, pred: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    /// Names of triggered rules, in order.
    pub fn triggered(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::RuleTriggered { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &EngineEvent) {
        self.events.lock().push(event.clone());
    }
}
