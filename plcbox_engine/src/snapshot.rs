//! Status published by a running engine.
//!
//! A display reads the snapshot instead of polling a board the engine owns.

use crate::machine::EngineLifecycle;
use parking_lot::RwLock;
use plcbox_common::board::{BoardInputs, DigitalOutputs, OutputCommand};
use std::sync::Arc;

/// Engine status as of the last published cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Lifecycle state.
    pub state: EngineLifecycle,
    /// Cycles completed.
    pub cycle_count: u64,
    /// Inputs read on the last cycle.
    pub inputs: BoardInputs,
    /// Outputs commanded on the last cycle.
    pub outputs: OutputCommand,
    /// Latch mask.
    pub latched: DigitalOutputs,
    /// Active blinkers.
    pub active_blinkers: usize,
    /// Pending delayed action sets.
    pub pending_timers: usize,
}

/// Shared, cloneable snapshot slot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl SnapshotCell {
    /// Create a cell holding an Idle snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot.
    pub fn publish(&self, snapshot: StatusSnapshot) {
        *self.inner.write() = snapshot;
    }

    /// Update the lifecycle state only.
    pub fn set_state(&self, state: EngineLifecycle) {
        self.inner.write().state = state;
    }

    /// Copy of the latest snapshot.
    pub fn get(&self) -> StatusSnapshot {
        *self.inner.read()
    }
}
