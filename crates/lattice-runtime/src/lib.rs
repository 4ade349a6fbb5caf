//! Lattice Runtime - configuration, logging and batch inspection for
//! `lattice-events`.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `LatticeConfig`)
//! - Logging configuration (`LoggingBuilder`, `init_from_config`)
//! - Batch inspection of event documents (`Inspector`, `InspectReport`)
//!
//! ```ignore
//! use lattice_runtime::{Inspector, config, logging};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = config::load_config()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let report = Inspector::new(config.inspect).inspect_file("sync.json")?;
//!     print!("{report}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod inspect;
pub mod logging;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, InspectConfig, LatticeConfig, LayerSelection,
    LoggingConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use inspect::{InspectReport, Inspector, ViolationRecord, extract_events};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};

// Re-export tracing for use by other crates
pub use tracing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
