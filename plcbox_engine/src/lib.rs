//! # plcbox Engine Library
//!
//! Rule evaluation and output composition for one I/O board. Every cycle
//! samples the board, evaluates the loaded rule set in priority order and
//! commands the resulting digital and analog outputs, including timing
//! effects: blinking, latching and delayed secondary actions.
//!
//! ## Layers
//!
//! 1. **Primitives** (`evaluate`, `actions`, `blink`, `delay`, `edge`) - pure
//!    or instant-driven, no hardware
//! 2. **EngineState** (`state`) - one cycle as `inputs + now → outputs`
//! 3. **ControlLoop** (`cycle`) - fixed-period pacing, board I/O, lifecycle
//!    (`machine`), status publishing (`snapshot`) and events (`events`)
//!
//! A hardware failure ends the run: outputs are cleared if the board is
//! still present and a critical event is emitted.

pub mod actions;
pub mod blink;
pub mod cycle;
pub mod delay;
pub mod edge;
pub mod error;
pub mod evaluate;
pub mod events;
pub mod machine;
pub mod snapshot;
pub mod state;

pub use crate::cycle::{ControlLoop, CycleStats, EngineHandle, EngineOptions};
pub use crate::error::EngineError;
pub use crate::events::{EngineEvent, EventSink, RecordingSink, TracingSink};
pub use crate::machine::EngineLifecycle;
pub use crate::snapshot::{SnapshotCell, StatusSnapshot};
pub use crate::state::{CycleOutput, EngineState};
