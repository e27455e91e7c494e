//! Range scanner - sweeps every usable host of one range
//!
//! The worker pool (a semaphore plus a `JoinSet`) lives only for the duration
//! of one [`RangeScanner::scan`] call. Dropping the `JoinSet` on any exit path
//! aborts whatever probes are still in flight.

use super::*;
use crate::error::SweepError;
use crate::events::{ScanEvent, ScanObserver};
use crate::utils::target_parser::AddressRange;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 100;

/// Every usable host of one range, in ascending address order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeResult {
    pub range: AddressRange,
    pub hosts: Vec<HostResult>,
}

impl RangeResult {
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn reachable(&self) -> impl Iterator<Item = &HostResult> {
        self.hosts.iter().filter(|h| h.status == HostStatus::Reachable)
    }

    pub fn unreachable(&self) -> impl Iterator<Item = &HostResult> {
        self.hosts.iter().filter(|h| h.status == HostStatus::Unreachable)
    }
}

/// Drives a [`HostProber`] over a range with at most `concurrency_limit`
/// probes in flight.
#[derive(Clone)]
pub struct RangeScanner {
    prober: Arc<dyn HostProber>,
    concurrency_limit: usize,
    observer: Option<Arc<dyn ScanObserver>>,
    cancel: CancellationToken,
}

impl RangeScanner {
    pub fn new(prober: Arc<dyn HostProber>) -> Self {
        Self {
            prober,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            observer: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Zero is treated as one
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Probe every usable host of `range`.
    ///
    /// Returns exactly one [`HostResult`] per host, ordered by address no
    /// matter when each probe finished. The only error is
    /// [`SweepError::Cancelled`]; the partial range is discarded in that case.
    pub async fn scan(&self, range: &AddressRange) -> Result<RangeResult, SweepError> {
        if self.cancel.is_cancelled() {
            return Err(SweepError::Cancelled);
        }

        let addresses: Vec<IpAddr> = range.hosts().collect();
        let total = addresses.len();
        let mut slots: Vec<Option<HostResult>> = vec![None; total];

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        log::debug!(
            "Sweeping {} ({} hosts, {} concurrent probes via {})",
            range,
            total,
            self.concurrency_limit,
            self.prober.method_name()
        );

        for (index, &address) in addresses.iter().enumerate() {
            // Waiting here is the queue: no task exists until a slot is free
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(SweepError::Cancelled),
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    permit.map_err(|_| SweepError::Cancelled)?
                }
            };

            let prober = Arc::clone(&self.prober);
            let observer = self.observer.clone();
            let completed = Arc::clone(&completed);

            tasks.spawn(async move {
                let result = prober.probe(address).await;
                drop(permit);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(observer) = observer {
                    observer.notify(ScanEvent::HostProbed {
                        result: result.clone(),
                        completed: done,
                        total,
                    });
                }
                (index, result)
            });
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(SweepError::Cancelled);
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                Some(Ok((index, result))) => slots[index] = Some(result),
                Some(Err(e)) => log::warn!("Probe task in {} failed: {}", range, e),
                None => break,
            }
        }

        let hosts = addresses
            .into_iter()
            .zip(slots)
            .map(|(address, slot)| slot.unwrap_or_else(|| HostResult::unreachable(address)))
            .collect();

        Ok(RangeResult {
            range: *range,
            hosts,
        })
    }
}
