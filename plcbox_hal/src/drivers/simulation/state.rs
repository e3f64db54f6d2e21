//! Shared state of a simulated board.

use parking_lot::Mutex;
use plcbox_common::board::{BoardInputs, DigitalInputs, DigitalOutputs, OutputCommand};
use std::collections::VecDeque;
use std::sync::Arc;

/// Number of writes a simulated board keeps; older entries are dropped.
pub const WRITE_LOG_CAPACITY: usize = 1024;

/// One successful write recorded by a simulated board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardWrite {
    /// `write_digital`
    Digital(DigitalOutputs),
    /// `write_analog`
    Analog(u8, u8),
    /// `clear_all`
    ClearAll,
}

#[derive(Debug)]
pub(crate) struct SimState {
    pub(crate) inputs: BoardInputs,
    pub(crate) outputs: OutputCommand,
    pub(crate) present: bool,
    pub(crate) fail_reads: bool,
    pub(crate) fail_writes: bool,
    pub(crate) writes: VecDeque<BoardWrite>,
    pub(crate) write_count: u64,
    pub(crate) analog_writes: u64,
    pub(crate) reads: u64,
    pub(crate) clear_attempts: u32,
}

impl SimState {
    fn new() -> Self {
        Self {
            inputs: BoardInputs::default(),
            outputs: OutputCommand::OFF,
            present: true,
            fail_reads: false,
            fail_writes: false,
            writes: VecDeque::with_capacity(WRITE_LOG_CAPACITY),
            write_count: 0,
            analog_writes: 0,
            reads: 0,
            clear_attempts: 0,
        }
    }

    /// Append a successful write, evicting the oldest one when full.
    pub(crate) fn record(&mut self, write: BoardWrite) {
        if self.writes.len() == WRITE_LOG_CAPACITY {
            self.writes.pop_front();
        }
        self.writes.push_back(write);
        self.write_count += 1;
        if matches!(write, BoardWrite::Analog(..)) {
            self.analog_writes += 1;
        }
    }
}

/// Handle sharing state with a [`super::SimulatedBoard`].
///
/// Cloning a handle is cheap; all clones and the board see the same state.
#[derive(Debug, Clone)]
pub struct SimulatedBoardHandle {
    pub(crate) state: Arc<Mutex<SimState>>,
}

impl SimulatedBoardHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::new())),
        }
    }

    /// Set one digital input (port 1..=5).
    pub fn set_digital_input(&self, port: u8, on: bool) {
        let mut state = self.state.lock();
        state.inputs.digital.set(DigitalInputs::port(port), on);
    }

    /// Replace all digital inputs at once.
    pub fn set_digital_inputs(&self, inputs: DigitalInputs) {
        self.state.lock().inputs.digital = inputs;
    }

    /// Set an analog input; port 2 selects input 2, anything else input 1.
    pub fn set_analog_input(&self, port: u8, value: u8) {
        let mut state = self.state.lock();
        if port == 2 {
            state.inputs.analog2 = value;
        } else {
            state.inputs.analog1 = value;
        }
    }

    /// Set both pulse counters.
    pub fn set_counters(&self, counter1: u16, counter2: u16) {
        let mut state = self.state.lock();
        state.inputs.counter1 = counter1;
        state.inputs.counter2 = counter2;
    }

    /// Plug or unplug the board. An unplugged board fails every call.
    pub fn set_present(&self, present: bool) {
        self.state.lock().present = present;
    }

    /// Make every `read_all` fail while set.
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Make every write (including `clear_all`) fail while set.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Levels currently driven by the board.
    pub fn outputs(&self) -> OutputCommand {
        self.state.lock().outputs
    }

    /// The last [`WRITE_LOG_CAPACITY`] successful writes, oldest first.
    pub fn writes(&self) -> Vec<BoardWrite> {
        self.state.lock().writes.iter().copied().collect()
    }

    /// Number of successful writes since creation, evicted ones included.
    pub fn write_count(&self) -> u64 {
        self.state.lock().write_count
    }

    /// Number of successful analog writes since creation.
    pub fn analog_write_count(&self) -> u64 {
        self.state.lock().analog_writes
    }

    /// Number of `clear_all` calls, failed ones included.
    pub fn clear_attempts(&self) -> u32 {
        self.state.lock().clear_attempts
    }

    /// Number of `read_all` calls, failed ones included.
    pub fn read_count(&self) -> u64 {
        self.state.lock().reads
    }
}
