//! Interface byte-counter sampling.
//!
//! Reads the whole counter table in one pass and partitions interfaces into
//! the WAN and AP groups by the configured membership lists, summing within
//! each group. Malformed lines are skipped, not fatal.

use std::time::Duration;

use chrono::Utc;
use pirouter_core::{CounterSample, GroupCounters, ProbeError, Result};

use crate::config::ProbeConfig;

const READ_TIMEOUT_SECS: u64 = 5;

/// Sample both counter groups from the configured counter table.
pub async fn sample_interface_counters(cfg: &ProbeConfig) -> Result<CounterSample> {
    let read = tokio::fs::read_to_string(&cfg.counters_path);
    let text = match tokio::time::timeout(Duration::from_secs(READ_TIMEOUT_SECS), read).await {
        Err(_) => return Err(ProbeError::timeout(&cfg.counters_path, READ_TIMEOUT_SECS)),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProbeError::Unavailable(cfg.counters_path.clone()))
        }
        Ok(Err(e)) => return Err(ProbeError::Io(e)),
        Ok(Ok(text)) => text,
    };

    let (wan, ap) = parse_counters(&text, &cfg.wan_group, &cfg.ap_group);
    Ok(CounterSample {
        wan,
        ap,
        timestamp_ms: Utc::now().timestamp_millis(),
    })
}

/// Parse `/proc/net/dev` format, summing rx/tx bytes per group.
///
/// Each data line is `iface: rx_bytes ... tx_bytes ...` with rx bytes in
/// column 1 and tx bytes in column 9 after the interface name.
pub fn parse_counters(
    text: &str,
    wan_group: &[String],
    ap_group: &[String],
) -> (GroupCounters, GroupCounters) {
    let mut wan = GroupCounters::default();
    let mut ap = GroupCounters::default();

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 10 {
            continue;
        }
        let iface = parts[0].trim_end_matches(':');
        let (rx, tx) = match (parts[1].parse::<u64>(), parts[9].parse::<u64>()) {
            (Ok(rx), Ok(tx)) => (rx, tx),
            _ => continue,
        };

        if wan_group.iter().any(|w| w == iface) {
            wan.rx_bytes += rx;
            wan.tx_bytes += tx;
        } else if ap_group.iter().any(|a| a == iface) {
            ap.rx_bytes += rx;
            ap.tx_bytes += tx;
        }
    }

    (wan, ap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  104013     834    0    0    0     0          0         0   104013     834    0    0    0     0       0          0
 wlan0: 5000000    4000    0    0    0     0          0         0  1000000     900    0    0    0     0       0          0
  eth0: 2500000    2000    0    0    0     0          0         0   500000     450    0    0    0     0       0          0
 wlan1:  300000     250    0    0    0     0          0         0  7000000    5500    0    0    0     0       0          0
   br0:  100000      80    0    0    0     0          0         0  1000000     800    0    0    0     0       0          0
";

    fn groups() -> (Vec<String>, Vec<String>) {
        (
            vec!["wlan0".to_string(), "eth0".to_string()],
            vec!["wlan1".to_string(), "br0".to_string()],
        )
    }

    #[test]
    fn test_group_sums() {
        let (wan_group, ap_group) = groups();
        let (wan, ap) = parse_counters(PROC_NET_DEV, &wan_group, &ap_group);
        assert_eq!(wan.rx_bytes, 7_500_000);
        assert_eq!(wan.tx_bytes, 1_500_000);
        assert_eq!(ap.rx_bytes, 400_000);
        assert_eq!(ap.tx_bytes, 8_000_000);
    }

    #[test]
    fn test_loopback_not_counted() {
        let (wan_group, ap_group) = groups();
        let (wan, ap) = parse_counters("lo: 1 2 3", &wan_group, &ap_group);
        assert_eq!(wan, GroupCounters::default());
        assert_eq!(ap, GroupCounters::default());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let text = "wlan0: not-a-number 0 0 0 0 0 0 0 99 0 0 0 0 0 0 0\n\
                    wlan0: 100 0 0 0 0 0 0 0 200 0 0 0 0 0 0 0";
        let (wan_group, ap_group) = groups();
        let (wan, _) = parse_counters(text, &wan_group, &ap_group);
        assert_eq!(wan.rx_bytes, 100);
        assert_eq!(wan.tx_bytes, 200);
    }

    #[tokio::test]
    async fn test_missing_table_is_unavailable() {
        let cfg = ProbeConfig {
            counters_path: "/nonexistent/net/dev".to_string(),
            ..ProbeConfig::default()
        };
        let err = sample_interface_counters(&cfg).await.unwrap_err();
        assert!(matches!(err, ProbeError::Unavailable(_)));
    }
}
