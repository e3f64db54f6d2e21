//! System-wide constants for the plcbox workspace.
//!
//! Single source of truth for port counts, limits and default paths.

use static_assertions::const_assert;

/// Number of digital inputs on a board (ports 1..=5).
pub const DIGITAL_INPUT_COUNT: u8 = 5;

/// Number of digital outputs on a board (ports 1..=8).
pub const DIGITAL_OUTPUT_COUNT: u8 = 8;

/// Number of analog inputs and of analog outputs (ports 1..=2).
pub const ANALOG_CHANNEL_COUNT: u8 = 2;

/// Mask of the bits a board reports for its digital inputs.
pub const DIGITAL_INPUT_MASK: u8 = (1 << DIGITAL_INPUT_COUNT) - 1;

/// Highest analog output level.
pub const ANALOG_MAX: u8 = u8::MAX;

/// Maximum number of boards addressable on one host (ids 0..=3).
pub const MAX_BOARDS: u8 = 4;

/// Default control loop period in milliseconds.
pub const DEFAULT_CYCLE_TIME_MS: u64 = 50;

/// Upper bound for the configurable control loop period.
pub const MAX_CYCLE_TIME_MS: u64 = 1000;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/plcbox/plcbox.toml";

/// Default driver used when neither config nor CLI names one.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Build the per-board rules file name (`rules_board_{id}.json`).
pub fn rules_file_name(board_id: u8) -> String {
    format!("rules_board_{board_id}.json")
}

// Output masks are a single byte on the wire.
const_assert!(DIGITAL_OUTPUT_COUNT <= 8);
const_assert!(DIGITAL_INPUT_COUNT <= DIGITAL_OUTPUT_COUNT);
const_assert!(DEFAULT_CYCLE_TIME_MS <= MAX_CYCLE_TIME_MS);
