//! Error taxonomy for the fleet simulation engine.
//!
//! Four fatal-or-transient categories, matching the propagation policy: a
//! truck-day unit aborts on its first fatal error; an external driving loop
//! continues with the next unit.

use thiserror::Error;

/// Raised by the fleet factory and config loading, before any generation runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("fault mode {0:?} has an inconsistent total-life range: min {1} > max {2}")]
    InconsistentFaultRange(crate::types::FaultMode, f64, f64),

    #[error("fleet size must be positive, got {0}")]
    InvalidFleetSize(u32),

    #[error("simulation horizon must be positive, got {0} days")]
    InvalidHorizon(u32),

    #[error("train/val/test split sizes {0}/{1}/{2} do not sum to fleet size {3}")]
    InvalidSplitSizes(u32, u32, u32, u32),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Raised when the assembled output violates the fixed row contract.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("feature vector has length {0}, expected 221")]
    WrongFeatureCount(usize),

    #[error("unknown fault mode label: {0}")]
    UnknownFaultMode(String),

    #[error("class distribution out of bounds: {0}")]
    DistributionOutOfBounds(String),
}

/// Indicates a violated internal invariant; always a bug, never
/// recoverable at the call site that raises it.
#[derive(Debug, Error)]
pub enum LogicError {
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Top-level error type returned by public, fallible entry points.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("logic error: {0}")]
    Logic(#[from] LogicError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
