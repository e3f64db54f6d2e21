//! Simulation driver implementation.
//!
//! The `SimulatedBoard` implements the `BoardDriver` trait on top of shared
//! in-memory state. Reads return whatever the handles last set; writes are
//! applied to the simulated outputs and recorded.

use super::state::{BoardWrite, SimState, SimulatedBoardHandle};
use plcbox_common::board::{BoardDriver, BoardError, BoardInputs, DigitalOutputs, OutputCommand};
use tracing::{debug, info};

/// Simulated K8055-class board.
pub struct SimulatedBoard {
    board_id: u8,
    handle: SimulatedBoardHandle,
}

impl SimulatedBoard {
    /// Create a plugged-in board with all inputs low and all outputs off.
    pub fn new(board_id: u8) -> Self {
        Self {
            board_id,
            handle: SimulatedBoardHandle::new(),
        }
    }

    /// A handle sharing this board's state.
    pub fn handle(&self) -> SimulatedBoardHandle {
        self.handle.clone()
    }

    fn check_writable(&self, state: &SimState) -> Result<(), BoardError> {
        if !state.present {
            return Err(BoardError::Disconnected(self.board_id));
        }
        if state.fail_writes {
            return Err(BoardError::WriteFailed(format!(
                "simulated write fault on board {}",
                self.board_id
            )));
        }
        Ok(())
    }
}

impl BoardDriver for SimulatedBoard {
    fn name(&self) -> &'static str {
        super::DRIVER_NAME
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn board_id(&self) -> u8 {
        self.board_id
    }

    fn init(&mut self) -> Result<(), BoardError> {
        let mut state = self.handle.state.lock();
        if !state.present {
            return Err(BoardError::InitFailed(format!(
                "simulated board {} not present",
                self.board_id
            )));
        }
        state.outputs = OutputCommand::OFF;
        info!("Simulated board {} initialized", self.board_id);
        Ok(())
    }

    fn is_present(&self) -> bool {
        self.handle.state.lock().present
    }

    fn read_all(&mut self) -> Result<BoardInputs, BoardError> {
        let mut state = self.handle.state.lock();
        state.reads += 1;
        if !state.present {
            return Err(BoardError::Disconnected(self.board_id));
        }
        if state.fail_reads {
            return Err(BoardError::ReadFailed(format!(
                "simulated read fault on board {}",
                self.board_id
            )));
        }
        Ok(state.inputs)
    }

    fn write_digital(&mut self, outputs: DigitalOutputs) -> Result<(), BoardError> {
        let mut state = self.handle.state.lock();
        self.check_writable(&state)?;
        state.outputs.digital = outputs;
        state.record(BoardWrite::Digital(outputs));
        Ok(())
    }

    fn write_analog(&mut self, analog1: u8, analog2: u8) -> Result<(), BoardError> {
        let mut state = self.handle.state.lock();
        self.check_writable(&state)?;
        state.outputs.analog1 = analog1;
        state.outputs.analog2 = analog2;
        state.record(BoardWrite::Analog(analog1, analog2));
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), BoardError> {
        let mut state = self.handle.state.lock();
        state.clear_attempts += 1;
        self.check_writable(&state)?;
        state.outputs = OutputCommand::OFF;
        state.record(BoardWrite::ClearAll);
        debug!("Simulated board {} cleared", self.board_id);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), BoardError> {
        debug!("Simulated board {} closed", self.board_id);
        Ok(())
    }
}
