//! Shared test helpers: an instrumented in-memory prober

#![allow(dead_code)]

use pingsweep::{HostProber, HostResult};
use rand::Rng;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Answers from a fixed set of live addresses and records how many probes
/// overlapped.
pub struct FakeProber {
    reachable: HashSet<IpAddr>,
    delay_ms: (u64, u64),
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn new<'a, I>(reachable: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            reachable: reachable.into_iter().map(|a| a.parse().unwrap()).collect(),
            delay_ms: (0, 0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep a random time in `min..=max` milliseconds per probe
    pub fn with_jitter(mut self, min: u64, max: u64) -> Self {
        self.delay_ms = (min, max);
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HostProber for FakeProber {
    async fn probe(&self, address: IpAddr) -> HostResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let (min, max) = self.delay_ms;
        if max > 0 {
            let delay = rand::thread_rng().gen_range(min..=max);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.reachable.contains(&address) {
            HostResult::reachable(address)
        } else {
            HostResult::unreachable(address)
        }
    }

    fn method_name(&self) -> &str {
        "fake"
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}
