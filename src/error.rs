//! Error handling for the sweeper
//!
//! Per-target and per-host problems never abort a run: resolution failures are
//! recorded in the report and skipped, probe failures become `Unreachable`.
//! `SweepError` covers what is left (configuration, I/O, cancellation).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a target specification could not be turned into a scannable range
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ResolutionError {
    #[error("Invalid IP address '{spec}': {reason}")]
    InvalidAddress { spec: String, reason: String },

    #[error("Invalid CIDR '{spec}': {reason}")]
    InvalidCidr { spec: String, reason: String },

    #[error("Range {range} from '{spec}' has {hosts} usable hosts (max: {limit})")]
    RangeTooLarge {
        spec: String,
        range: String,
        hosts: u128,
        limit: u64,
    },
}

impl ResolutionError {
    /// The raw specification that failed
    pub fn spec(&self) -> &str {
        match self {
            ResolutionError::InvalidAddress { spec, .. }
            | ResolutionError::InvalidCidr { spec, .. }
            | ResolutionError::RangeTooLarge { spec, .. } => spec,
        }
    }
}

/// Main error type for sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Scan cancelled")]
    Cancelled,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
