//! Structured scan events
//!
//! The library never prints. Progress and per-target notices are emitted as
//! [`ScanEvent`]s to an optional [`ScanObserver`]; rendering them is up to the
//! caller. Observers are not needed for correctness.

use crate::discovery::HostResult;
use crate::error::ResolutionError;
use crate::utils::target_parser::AddressRange;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub enum ScanEvent {
    /// A target resolved and its range is about to be swept
    RangeStarted {
        spec: String,
        range: AddressRange,
        hosts: usize,
    },
    /// One probe finished; `completed` counts finished probes in the current range
    HostProbed {
        result: HostResult,
        completed: usize,
        total: usize,
    },
    RangeFinished {
        range_id: String,
        reachable: usize,
        unreachable: usize,
    },
    /// A target was skipped
    SpecRejected { error: ResolutionError },
    /// A range id was already present; the earlier entry's data was replaced
    RangeIdCollision { range_id: String, range: AddressRange },
    Cancelled,
}

pub trait ScanObserver: Send + Sync {
    fn notify(&self, event: ScanEvent);
}

impl<F> ScanObserver for F
where
    F: Fn(ScanEvent) + Send + Sync,
{
    fn notify(&self, event: ScanEvent) {
        self(event)
    }
}
