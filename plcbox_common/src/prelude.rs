//! Prelude module for common re-exports.
//!
//! ```rust
//! use plcbox_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, EngineSection, PlcboxConfig, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{
    ANALOG_CHANNEL_COUNT, DEFAULT_CYCLE_TIME_MS, DIGITAL_INPUT_COUNT, DIGITAL_OUTPUT_COUNT,
    MAX_BOARDS,
};

// ─── Board I/O ──────────────────────────────────────────────────────
pub use crate::board::{
    BoardDriver, BoardError, BoardInputs, DigitalInputs, DigitalOutputs, DriverFactory,
    OutputCommand,
};

// ─── Rules ──────────────────────────────────────────────────────────
pub use crate::rules::{
    Action, Comparison, Condition, ConditionLogic, DelayedAction, DigitalMode, Rule, RuleError,
    RuleId, RuleSet,
};
