//! Shared board access.
//!
//! An engine and a status poller may hold the same board. `SharedBoard`
//! wraps the driver in a mutex so that every driver call is atomic with
//! respect to other holders: a poller read can never land between an
//! engine's read and its writes for the same call.

use parking_lot::{Mutex, MutexGuard};
use plcbox_common::board::{BoardDriver, BoardError, BoardInputs, DigitalOutputs};
use std::sync::Arc;

/// Cloneable, lock-protected board driver.
#[derive(Clone)]
pub struct SharedBoard {
    inner: Arc<Mutex<Box<dyn BoardDriver>>>,
    board_id: u8,
    name: &'static str,
    version: &'static str,
}

impl SharedBoard {
    /// Wrap a driver.
    pub fn new(driver: Box<dyn BoardDriver>) -> Self {
        let board_id = driver.board_id();
        let name = driver.name();
        let version = driver.version();
        Self {
            inner: Arc::new(Mutex::new(driver)),
            board_id,
            name,
            version,
        }
    }

    /// Hold the board for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn BoardDriver>> {
        self.inner.lock()
    }

    /// Number of live handles to this board.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl std::fmt::Debug for SharedBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBoard")
            .field("board_id", &self.board_id)
            .field("driver", &self.name)
            .finish_non_exhaustive()
    }
}

impl BoardDriver for SharedBoard {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn board_id(&self) -> u8 {
        self.board_id
    }

    fn init(&mut self) -> Result<(), BoardError> {
        self.inner.lock().init()
    }

    fn is_present(&self) -> bool {
        self.inner.lock().is_present()
    }

    fn read_all(&mut self) -> Result<BoardInputs, BoardError> {
        self.inner.lock().read_all()
    }

    fn write_digital(&mut self, outputs: DigitalOutputs) -> Result<(), BoardError> {
        self.inner.lock().write_digital(outputs)
    }

    fn write_analog(&mut self, analog1: u8, analog2: u8) -> Result<(), BoardError> {
        self.inner.lock().write_analog(analog1, analog2)
    }

    fn clear_all(&mut self) -> Result<(), BoardError> {
        self.inner.lock().clear_all()
    }

    fn shutdown(&mut self) -> Result<(), BoardError> {
        self.inner.lock().shutdown()
    }
}
