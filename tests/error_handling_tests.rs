//! Bad input and failing probes must never abort a run

mod common;

use common::{ip, FakeProber};
use pingsweep::{
    HostProber, HostResult, HostStatus, ResolutionError, ScanEngine, ScanEvent, SweepConfig,
};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_invalid_entry_yields_empty_report() {
    let rejected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&rejected);

    let engine = ScanEngine::new(SweepConfig::default(), Arc::new(FakeProber::new(["10.0.0.1"])))
        .unwrap()
        .with_observer(Arc::new(move |event: ScanEvent| {
            if let ScanEvent::SpecRejected { error } = event {
                sink.lock().unwrap().push(error.spec().to_string());
            }
        }));

    let report = engine.run(["not-an-ip"]).await;

    assert!(report.is_empty());
    assert!(report.all_reachable.is_empty());
    assert!(report.all_unreachable.is_empty());
    assert!(!report.cancelled);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], ResolutionError::InvalidAddress { .. }));
    assert_eq!(*rejected.lock().unwrap(), vec!["not-an-ip".to_string()]);
}

#[tokio::test]
async fn test_bad_specs_are_skipped_in_place() {
    let prober = Arc::new(FakeProber::new(["10.0.0.1", "10.0.1.2"]));
    let engine = ScanEngine::new(SweepConfig::default(), prober).unwrap();

    let report = engine
        .run(["10.0.0.0/30", "10.0.0.0/33", "999.1.1.1", "10.0.1.0/30", "10.0.2.0/abc"])
        .await;

    assert_eq!(report.range_ids().collect::<Vec<_>>(), vec!["10.0.0.0_30", "10.0.1.0_30"]);
    assert_eq!(report.all_reachable, vec![ip("10.0.0.1"), ip("10.0.1.2")]);

    let failed: Vec<&str> = report.failures.iter().map(|f| f.spec()).collect();
    assert_eq!(failed, vec!["10.0.0.0/33", "999.1.1.1", "10.0.2.0/abc"]);
    assert!(matches!(report.failures[0], ResolutionError::InvalidCidr { .. }));
    assert!(matches!(report.failures[1], ResolutionError::InvalidAddress { .. }));
    assert!(matches!(report.failures[2], ResolutionError::InvalidCidr { .. }));
}

#[tokio::test]
async fn test_oversized_range_is_rejected_not_fatal() {
    let config = SweepConfig::default().with_max_hosts(300);
    let engine = ScanEngine::new(config, Arc::new(FakeProber::new(Vec::<&str>::new()))).unwrap();

    let report = engine.run(["10.0.0.0/16", "2001:db8::/64", "10.0.0.0/24"]).await;

    assert_eq!(report.range_ids().collect::<Vec<_>>(), vec!["10.0.0.0_24"]);
    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f, ResolutionError::RangeTooLarge { .. })));
}

/// Panics for every other address
struct FlakyProber;

#[async_trait::async_trait]
impl HostProber for FlakyProber {
    async fn probe(&self, address: IpAddr) -> HostResult {
        match address {
            IpAddr::V4(v4) if v4.octets()[3] % 2 == 0 => panic!("socket error"),
            _ => HostResult::reachable(address),
        }
    }

    fn method_name(&self) -> &str {
        "flaky"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_probe_failures_become_unreachable() {
    let config = SweepConfig::default().with_concurrency(3);
    let engine = ScanEngine::new(config, Arc::new(FlakyProber)).unwrap();

    let report = engine.run(["10.0.0.0/29"]).await;
    let range = report.get("10.0.0.0_29").unwrap();

    assert_eq!(range.len(), 6);
    for host in &range.hosts {
        let expected = match host.address {
            IpAddr::V4(v4) if v4.octets()[3] % 2 == 0 => HostStatus::Unreachable,
            _ => HostStatus::Reachable,
        };
        assert_eq!(host.status, expected, "{}", host.address);
    }
    assert_eq!(report.all_reachable, vec![ip("10.0.0.1"), ip("10.0.0.3"), ip("10.0.0.5")]);
}
