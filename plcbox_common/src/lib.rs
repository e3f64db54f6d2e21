//! plcbox Common Library
//!
//! This crate provides the rule model, the board driver interface and
//! configuration loading utilities shared by all plcbox workspace crates.
//!
//! # Module Structure
//!
//! - [`board`] - Board I/O types and the `BoardDriver` trait
//! - [`rules`] - Rule model, JSON interchange format and rule files
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Port counts, limits and default paths
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use plcbox_common::prelude::*;
//! ```

pub mod board;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod rules;
