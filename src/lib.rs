//! Pingsweep - concurrent ICMP liveness sweeps over IP ranges
//!
//! Target specifications (bare addresses or CIDR ranges) are resolved to
//! normalized ranges, every usable host is probed under a bounded concurrency
//! limit, and the results are aggregated per range and globally.

pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod output;
pub mod scanner;
pub mod utils;

// Re-export commonly used types
pub use config::SweepConfig;
pub use discovery::{HostProber, HostResult, HostStatus, IcmpEchoProber, RangeResult, RangeScanner};
pub use error::{ResolutionError, SweepError};
pub use events::{ScanEvent, ScanObserver};
pub use scanner::{ScanEngine, ScanReport};
pub use utils::target_parser::{resolve, AddressRange};

pub type Result<T> = std::result::Result<T, SweepError>;
