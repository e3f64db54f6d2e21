//! Board I/O types and driver interface.
//!
//! This module contains the types exchanged with an I/O board and the
//! trait every board driver implements.

pub mod driver;
pub mod types;

pub use driver::{BoardDriver, BoardError, DriverFactory};
pub use types::{BoardInputs, DigitalInputs, DigitalOutputs, OutputCommand};
