//! Driver registry for board drivers.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving board
//! driver factories. This uses constructor-injection rather than global state.

use plcbox_common::board::{BoardDriver, BoardError, DriverFactory};
use std::collections::HashMap;

/// Registry of available board drivers.
///
/// Constructed at startup, populated via `register()`, and queried by the
/// application shell. No global state, testable in isolation.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in driver.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_all_drivers(&mut registry);
        registry
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Create a driver instance by name, bound to `board_id`.
    ///
    /// # Errors
    /// Returns `BoardError::DriverNotFound` if no driver with the given name is registered.
    pub fn create_driver(
        &self,
        name: &str,
        board_id: u8,
    ) -> Result<Box<dyn BoardDriver>, BoardError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| BoardError::DriverNotFound(name.to_string()))?;
        Ok(factory(board_id))
    }

    /// List all registered driver names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
