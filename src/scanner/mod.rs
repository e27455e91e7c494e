//! Scan orchestration and the aggregated report

pub mod engine;

use crate::discovery::{HostStatus, RangeResult};
use crate::error::ResolutionError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

pub use engine::ScanEngine;

/// One swept range, keyed by its range id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeEntry {
    pub id: String,
    pub result: RangeResult,
}

/// Aggregate of a whole run.
///
/// `ranges` is in first-insertion order. The global lists follow input
/// order, then address order within each range.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub ranges: Vec<RangeEntry>,
    pub all_reachable: Vec<IpAddr>,
    pub all_unreachable: Vec<IpAddr>,
    /// Targets that were skipped, in input order
    pub failures: Vec<ResolutionError>,
    /// Set when the run stopped early; only fully swept ranges are present
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for ScanReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanReport {
    pub fn new() -> Self {
        Self {
            ranges: Vec::new(),
            all_reachable: Vec::new(),
            all_unreachable: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RangeResult> {
        self.ranges.iter().find(|entry| entry.id == id).map(|entry| &entry.result)
    }

    pub fn range_ids(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|entry| entry.id.as_str())
    }

    pub fn total_hosts(&self) -> usize {
        self.all_reachable.len() + self.all_unreachable.len()
    }

    /// Merge a finished range into the report.
    ///
    /// Hosts are appended to the global lists. If `id` is already taken the
    /// existing entry keeps its position but its data is replaced, and
    /// `true` is returned.
    pub fn insert(&mut self, id: String, result: RangeResult) -> bool {
        for host in &result.hosts {
            match host.status {
                HostStatus::Reachable => self.all_reachable.push(host.address),
                HostStatus::Unreachable => self.all_unreachable.push(host.address),
            }
        }

        match self.ranges.iter_mut().find(|entry| entry.id == id) {
            Some(existing) => {
                existing.result = result;
                true
            }
            None => {
                self.ranges.push(RangeEntry { id, result });
                false
            }
        }
    }

    pub(crate) fn record_failure(&mut self, error: ResolutionError) {
        self.failures.push(error);
    }

    pub(crate) fn finish(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
        self.finished_at = Some(Utc::now());
    }
}
