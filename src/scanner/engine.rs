//! Scan orchestrator - resolves each target, sweeps it and aggregates the report
//!
//! Ranges are processed one after another; hosts inside a range are probed
//! concurrently by the [`RangeScanner`]. Bad targets are recorded and skipped.
//!
//! Cancellation stops the run between targets or in the middle of a range. The
//! interrupted range is dropped, every range finished before it is kept, and
//! the returned report has `cancelled` set.

use super::ScanReport;
use crate::config::SweepConfig;
use crate::discovery::{HostProber, IcmpEchoProber, RangeScanner};
use crate::error::ResolutionError;
use crate::events::{ScanEvent, ScanObserver};
use crate::utils::target_parser::{resolve, AddressRange};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct ScanEngine {
    config: SweepConfig,
    prober: Arc<dyn HostProber>,
    observer: Option<Arc<dyn ScanObserver>>,
    cancel: CancellationToken,
}

impl ScanEngine {
    /// Create an engine that probes through `prober`
    pub fn new(config: SweepConfig, prober: Arc<dyn HostProber>) -> crate::Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            prober,
            observer: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Create an engine that probes with the system ping
    pub fn with_icmp(config: SweepConfig) -> crate::Result<Self> {
        let prober = IcmpEchoProber::new(config.timeout_duration())
            .with_program(config.ping_program.clone());
        Self::new(config, Arc::new(prober))
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts the run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(observer) = &self.observer {
            observer.notify(event);
        }
    }

    fn range_scanner(&self) -> RangeScanner {
        let scanner = RangeScanner::new(Arc::clone(&self.prober))
            .with_concurrency(self.config.concurrency_limit)
            .with_cancellation(self.cancel.clone());

        match &self.observer {
            Some(observer) => scanner.with_observer(Arc::clone(observer)),
            None => scanner,
        }
    }

    /// Resolve a target and enforce the per-range host cap
    fn resolve_bounded(&self, spec: &str) -> Result<AddressRange, ResolutionError> {
        let range = resolve(spec)?;
        let hosts = range.usable_host_count();

        if hosts > u128::from(self.config.max_hosts_per_range) {
            return Err(ResolutionError::RangeTooLarge {
                spec: spec.to_string(),
                range: range.to_string(),
                hosts,
                limit: self.config.max_hosts_per_range,
            });
        }

        Ok(range)
    }

    /// Sweep every target in order and build the report.
    ///
    /// Never fails: bad targets end up in `ScanReport::failures`, probe errors
    /// as `Unreachable` hosts.
    pub async fn run<I, S>(&self, specs: I) -> ScanReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scanner = self.range_scanner();
        let mut report = ScanReport::new();
        let mut cancelled = false;

        for spec in specs {
            let spec = spec.as_ref();

            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let range = match self.resolve_bounded(spec) {
                Ok(range) => range,
                Err(e) => {
                    log::warn!("Skipping target: {}", e);
                    self.emit(ScanEvent::SpecRejected { error: e.clone() });
                    report.record_failure(e);
                    continue;
                }
            };

            // resolve_bounded caps the count well below usize::MAX
            let hosts = range.usable_host_count() as usize;
            log::info!("Scanning: {} ({} hosts)", range, hosts);
            self.emit(ScanEvent::RangeStarted {
                spec: spec.to_string(),
                range,
                hosts,
            });

            // a range sweep only fails when the run is cancelled
            let Ok(result) = scanner.scan(&range).await else {
                cancelled = true;
                break;
            };

            let range_id = range.range_id();
            let reachable = result.reachable().count();
            let unreachable = result.len() - reachable;

            if report.insert(range_id.clone(), result) {
                log::warn!(
                    "Range id {} already used; {} replaces the earlier entry",
                    range_id,
                    range
                );
                self.emit(ScanEvent::RangeIdCollision {
                    range_id: range_id.clone(),
                    range,
                });
            }

            log::info!("{}: {} reachable, {} unreachable", range, reachable, unreachable);
            self.emit(ScanEvent::RangeFinished {
                range_id,
                reachable,
                unreachable,
            });
        }

        if cancelled {
            log::warn!("Scan cancelled; report covers {} completed ranges", report.len());
            self.emit(ScanEvent::Cancelled);
        }

        report.finish(cancelled);
        report
    }
}
