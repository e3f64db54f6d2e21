//! Board driver implementations.
//!
//! - [`simulation`] - In-memory board for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `BoardDriver` trait from `plcbox_common::board`
//! 3. Register the driver in [`register_all_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register(simulation::DRIVER_NAME, simulation::create_driver);
}
