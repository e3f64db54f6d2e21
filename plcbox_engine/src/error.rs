//! Engine error types.

use crate::machine::EngineLifecycle;
use plcbox_common::board::BoardError;
use thiserror::Error;

/// Errors ending or preventing an engine run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `run` was called on an engine that is not Idle.
    #[error("Engine already started (state: {0})")]
    AlreadyStarted(EngineLifecycle),

    /// The board failed during the run. Outputs were cleared if the board
    /// was still present.
    #[error("Board failure: {0}")]
    Board(#[from] BoardError),

    /// The control thread could not be created.
    #[error("Failed to spawn engine thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The control thread panicked.
    #[error("Engine thread panicked")]
    Panicked,
}
