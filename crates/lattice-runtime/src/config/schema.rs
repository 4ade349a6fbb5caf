//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use lattice_events::EventLayer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Batch inspection settings.
    #[serde(default)]
    pub inspect: InspectConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to compact otherwise.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-target level overrides, e.g. `lattice_events = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,

    /// Span lifecycle events.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,
}

// =============================================================================
// Inspection
// =============================================================================

/// How to pick the envelope for each event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSelection {
    /// Detect from the keys present.
    #[default]
    Auto,
    Base,
    Stripped,
    Room,
    State,
}

impl LayerSelection {
    /// Returns the layer to decode `obj` as.
    pub fn layer_for(self, obj: &Value) -> EventLayer {
        match self {
            Self::Auto => EventLayer::detect(obj),
            Self::Base => EventLayer::Base,
            Self::Stripped => EventLayer::Stripped,
            Self::Room => EventLayer::Room,
            Self::State => EventLayer::State,
        }
    }
}

/// Batch inspection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectConfig {
    /// Envelope selection.
    #[serde(default)]
    pub layer: LayerSelection,

    /// Treat any violation as a failure.
    #[serde(default)]
    pub strict: bool,

    /// Re-encode every event and check it decodes to the same value.
    #[serde(default = "default_verify_round_trip")]
    pub verify_round_trip: bool,

    /// Cap on violations listed in a report.
    #[serde(default = "default_max_reported_violations")]
    pub max_reported_violations: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            layer: LayerSelection::default(),
            strict: false,
            verify_round_trip: default_verify_round_trip(),
            max_reported_violations: default_max_reported_violations(),
        }
    }
}

fn default_verify_round_trip() -> bool {
    true
}

fn default_max_reported_violations() -> usize {
    50
}
