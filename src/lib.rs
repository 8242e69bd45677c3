//! tabpilot library
//!
//! Exposes configuration, dry-run hosts and component wiring for the CLI and
//! for integration testing.

pub mod assembly;
pub mod cli;
pub mod config;
pub mod hosts;

pub use assembly::Assembly;
pub use config::{Config, ConfigError};
