//! Property-based tests for target resolution

use pingsweep::resolve;
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};

proptest! {
    #[test]
    fn bare_ipv4_widens_to_its_slash_24(raw in any::<u32>()) {
        let address = Ipv4Addr::from(raw);
        let range = resolve(&address.to_string()).unwrap();

        prop_assert_eq!(range.prefix(), 24);
        prop_assert_eq!(range.network(), IpAddr::V4(Ipv4Addr::from(raw & 0xFFFF_FF00)));
    }

    #[test]
    fn host_bits_are_ignored(raw in any::<u32>(), prefix in 0u8..=32) {
        let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
        let loose = resolve(&format!("{}/{}", Ipv4Addr::from(raw), prefix)).unwrap();
        let strict = resolve(&format!("{}/{}", Ipv4Addr::from(raw & mask), prefix)).unwrap();

        prop_assert_eq!(loose, strict);
    }

    #[test]
    fn hosts_are_ascending_and_counted(raw in any::<u32>(), prefix in 22u8..=32) {
        let range = resolve(&format!("{}/{}", Ipv4Addr::from(raw), prefix)).unwrap();
        let hosts: Vec<IpAddr> = range.hosts().collect();

        prop_assert_eq!(hosts.len() as u128, range.usable_host_count());
        prop_assert!(hosts.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(!hosts.is_empty());
    }

    #[test]
    fn range_id_is_bounded(raw in any::<u128>(), prefix in 0u8..=128) {
        let spec = format!("{}/{}", std::net::Ipv6Addr::from(raw), prefix);
        let range = resolve(&spec).unwrap();

        let id = range.range_id();
        prop_assert!(id.len() <= 31);
        prop_assert!(id.ends_with(&prefix.to_string()) || id.len() == 31);
    }

    #[test]
    fn garbage_never_panics(input in "\\PC{0,40}") {
        let _ = resolve(&input);
    }
}
