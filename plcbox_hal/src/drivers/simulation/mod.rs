//! Simulation driver module.
//!
//! An in-memory board for development and testing without physical
//! hardware. Every driver hands out [`SimulatedBoardHandle`]s that share its
//! state, so a test or operator can drive the inputs, inspect writes and
//! inject faults on a board an engine owns.

mod driver;
mod state;

pub use driver::SimulatedBoard;
pub use state::{BoardWrite, SimulatedBoardHandle, WRITE_LOG_CAPACITY};

use plcbox_common::board::BoardDriver;

/// Registry name of the simulation driver.
pub const DRIVER_NAME: &str = "simulation";

/// Factory function to create a simulation driver instance.
pub fn create_driver(board_id: u8) -> Box<dyn BoardDriver> {
    Box::new(SimulatedBoard::new(board_id))
}
