//! Host discovery - liveness probing and per-range sweeps
//!
//! A [`HostProber`] classifies one address; the [`RangeScanner`] drives a
//! prober over every usable host of a range under a bounded concurrency limit.

pub mod engine;
pub mod methods;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

pub use engine::{RangeResult, RangeScanner, DEFAULT_CONCURRENCY_LIMIT};
pub use methods::IcmpEchoProber;

/// Liveness classification of a single host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostStatus {
    Reachable,
    Unreachable,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostStatus::Reachable => write!(f, "Reachable"),
            HostStatus::Unreachable => write!(f, "Unreachable"),
        }
    }
}

/// Probe outcome for a single address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    pub address: IpAddr,
    pub status: HostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<Duration>,
}

impl HostResult {
    pub fn new(address: IpAddr, status: HostStatus) -> Self {
        Self {
            address,
            status,
            response_time: None,
        }
    }

    pub fn reachable(address: IpAddr) -> Self {
        Self::new(address, HostStatus::Reachable)
    }

    pub fn unreachable(address: IpAddr) -> Self {
        Self::new(address, HostStatus::Unreachable)
    }

    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response_time = Some(response_time);
        self
    }

    pub fn is_reachable(&self) -> bool {
        self.status == HostStatus::Reachable
    }
}

/// A single-attempt liveness probe.
///
/// Implementations must always return a classification: transport errors,
/// timeouts and anything unexpected are reported as `Unreachable`.
#[async_trait::async_trait]
pub trait HostProber: Send + Sync {
    async fn probe(&self, address: IpAddr) -> HostResult;

    fn method_name(&self) -> &str;
}
