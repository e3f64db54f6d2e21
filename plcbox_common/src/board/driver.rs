//! Board driver trait and error types.
//!
//! This module defines:
//! - `BoardDriver` trait - Interface for pluggable board backends
//! - `BoardError` enum - Error types for board operations
//! - `DriverFactory` type alias - Factory function type

use crate::board::types::{BoardInputs, DigitalOutputs};
use thiserror::Error;

/// Error types for board operations.
///
/// Every read or write failure is fatal to an engine run; the engine never
/// retries. Reconnect policy belongs to the driver or the application shell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Board no longer answers (unplugged, handle closed).
    #[error("Board {0} disconnected")]
    Disconnected(u8),

    /// Reading inputs failed.
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Writing outputs failed.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Driver initialization failed.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Driver not found in the registry.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

/// Factory function type for creating a driver bound to a board id.
pub type DriverFactory = fn(u8) -> Box<dyn BoardDriver>;

/// Trait defining the interface for board drivers.
///
/// The control loop talks to hardware only through this trait, so the
/// engine can run against a USB board, a simulation, or a test double.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the control loop starts
/// 2. `read_all()` / `write_*()` - Called every cycle from the control loop
/// 3. `clear_all()` - Called once when the loop stops, if `is_present()`
/// 4. `shutdown()` - Called when the application closes the board
///
/// Calls must return promptly or fail; bounding a hung transfer is the
/// driver's responsibility.
pub trait BoardDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Address of the board this driver is bound to.
    fn board_id(&self) -> u8;

    /// Open the board and reset its outputs.
    ///
    /// Default implementation does nothing.
    fn init(&mut self) -> Result<(), BoardError> {
        Ok(())
    }

    /// Whether the board is still reachable.
    fn is_present(&self) -> bool;

    /// Sample all inputs and counters in one transfer.
    fn read_all(&mut self) -> Result<BoardInputs, BoardError>;

    /// Write all eight digital outputs.
    fn write_digital(&mut self, outputs: DigitalOutputs) -> Result<(), BoardError>;

    /// Write both analog outputs.
    fn write_analog(&mut self, analog1: u8, analog2: u8) -> Result<(), BoardError>;

    /// De-energize every output: digital off, analog to zero.
    fn clear_all(&mut self) -> Result<(), BoardError>;

    /// Release the board.
    ///
    /// Default implementation does nothing.
    fn shutdown(&mut self) -> Result<(), BoardError> {
        Ok(())
    }
}

impl<D: BoardDriver + ?Sized> BoardDriver for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn version(&self) -> &'static str {
        (**self).version()
    }

    fn board_id(&self) -> u8 {
        (**self).board_id()
    }

    fn init(&mut self) -> Result<(), BoardError> {
        (**self).init()
    }

    fn is_present(&self) -> bool {
        (**self).is_present()
    }

    fn read_all(&mut self) -> Result<BoardInputs, BoardError> {
        (**self).read_all()
    }

    fn write_digital(&mut self, outputs: DigitalOutputs) -> Result<(), BoardError> {
        (**self).write_digital(outputs)
    }

    fn write_analog(&mut self, analog1: u8, analog2: u8) -> Result<(), BoardError> {
        (**self).write_analog(analog1, analog2)
    }

    fn clear_all(&mut self) -> Result<(), BoardError> {
        (**self).clear_all()
    }

    fn shutdown(&mut self) -> Result<(), BoardError> {
        (**self).shutdown()
    }
}
