//! # plcbox HAL Library
//!
//! Board drivers with a pluggable registry.
//!
//! Drivers implement the `BoardDriver` trait defined in
//! `plcbox_common::board`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//! - [`shared`] - Lock-protected board shared between an engine and a poller
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         plcbox_hal                            │
//! │  ┌──────────────────┐    ┌──────────────┐    ┌─────────────┐  │
//! │  │ Driver Registry  │───►│ BoardDriver  │◄───│ SharedBoard │  │
//! │  │ (name → factory) │    │ trait object │    │  (Mutex)    │  │
//! │  └──────────────────┘    └──────────────┘    └─────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;
pub mod shared;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::{SimulatedBoard, SimulatedBoardHandle};
pub use crate::shared::SharedBoard;
