//! Access-point station dump.
//!
//! Wraps `iw dev <ap> station dump` and parses the attached stations with
//! their signal readings. Used for the station count in stats and for
//! enriching the client list by MAC join.

use pirouter_core::Result;

use crate::config::ProbeConfig;
use crate::shell;

const DUMP_TIMEOUT_SECS: u64 = 10;

/// One attached station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    /// Station MAC, as printed by the tool.
    pub mac: String,
    /// Raw signal text (e.g. "-54 dBm"), when present.
    pub signal: Option<String>,
}

/// Dump the stations attached to the access-point interface.
pub async fn sample_station_dump(cfg: &ProbeConfig) -> Result<Vec<Station>> {
    let out = shell::run(
        "iw",
        &["dev", &cfg.ap_iface, "station", "dump"],
        DUMP_TIMEOUT_SECS,
    )
    .await?;
    Ok(parse_station_dump(&out.stdout))
}

/// Parse `iw station dump` output: `Station <mac> (...)` headers followed by
/// indented attribute lines, `signal:` among them.
pub fn parse_station_dump(output: &str) -> Vec<Station> {
    let mut stations = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Station ") {
            if let Some(mac) = rest.split_whitespace().next() {
                stations.push(Station {
                    mac: mac.to_string(),
                    signal: None,
                });
            }
        } else if let Some(signal) = line.strip_prefix("signal:") {
            if let Some(last) = stations.last_mut() {
                if last.signal.is_none() {
                    last.signal = Some(signal.trim().to_string());
                }
            }
        }
    }

    stations
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
Station aa:bb:cc:dd:ee:01 (on wlan1)
\tinactive time:\t10 ms
\tsignal:  \t-48 [-50, -52] dBm
\tsignal avg:\t-49 dBm
Station aa:bb:cc:dd:ee:02 (on wlan1)
\tinactive time:\t220 ms
";

    #[test]
    fn test_parse_station_dump() {
        let stations = parse_station_dump(DUMP);
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].mac, "aa:bb:cc:dd:ee:01");
        assert_eq!(stations[0].signal.as_deref(), Some("-48 [-50, -52] dBm"));
        assert_eq!(stations[1].mac, "aa:bb:cc:dd:ee:02");
        assert_eq!(stations[1].signal, None);
    }

    #[test]
    fn test_signal_avg_does_not_overwrite_signal() {
        let stations = parse_station_dump(DUMP);
        // "signal avg:" must not replace the first "signal:" reading.
        assert_eq!(stations[0].signal.as_deref(), Some("-48 [-50, -52] dBm"));
    }

    #[test]
    fn test_empty_dump() {
        assert!(parse_station_dump("").is_empty());
    }
}
