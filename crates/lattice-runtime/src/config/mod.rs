//! Configuration module for the lattice runtime.
//!
//! This module provides layered configuration loading and validation for
//! logging and batch inspection.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    InspectConfig, LatticeConfig, LayerSelection, LogFormat, LogLevel, LogOutput, LoggingConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
