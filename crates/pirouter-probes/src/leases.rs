//! DHCP lease table probes.
//!
//! Parses the dnsmasq lease table, joins it with the station dump by
//! case-insensitive MAC to produce the connected-client view, and removes
//! expired leases from the table itself (source of truth, not just the
//! view).

use chrono::Utc;
use pirouter_core::{ClientLease, DhcpLease, ProbeError, Result};
use tracing::debug;

use crate::config::ProbeConfig;
use crate::station;

/// Read and parse the lease table.
pub async fn sample_dhcp_leases(cfg: &ProbeConfig) -> Result<Vec<DhcpLease>> {
    let text = read_lease_file(&cfg.leases_path).await?;
    Ok(parse_leases(&text))
}

/// Connected-client view: lease table joined with station signal by MAC.
///
/// The station dump is best-effort; if it fails, clients are listed without
/// signal readings instead of failing the probe.
pub async fn sample_ap_clients(cfg: &ProbeConfig) -> Result<Vec<ClientLease>> {
    let leases = sample_dhcp_leases(cfg).await?;

    let stations = match station::sample_station_dump(cfg).await {
        Ok(stations) => stations,
        Err(e) => {
            debug!(error = %e, "station dump failed, listing clients without signal");
            Vec::new()
        }
    };

    Ok(join_clients(leases, &stations, &cfg.ap_iface))
}

/// Remove leases whose expiry is not in the future, rewriting the table.
///
/// Returns the number of removed leases. Lines that do not parse as leases
/// are preserved untouched.
pub async fn cleanup_expired(cfg: &ProbeConfig) -> Result<usize> {
    let text = read_lease_file(&cfg.leases_path).await?;
    let now_secs = Utc::now().timestamp();

    let (kept, removed) = partition_expired(&text, now_secs);
    if removed > 0 {
        tokio::fs::write(&cfg.leases_path, kept).await?;
    }
    Ok(removed)
}

async fn read_lease_file(path: &str) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ProbeError::Unavailable(path.to_string()))
        }
        Err(e) => Err(ProbeError::Io(e)),
    }
}

/// Parse dnsmasq lease lines: `expiry mac ip hostname client-id`.
/// A hostname of `*` means the client reported none.
pub fn parse_leases(text: &str) -> Vec<DhcpLease> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return None;
            }
            let expires_at = parts[0].parse().ok()?;
            Some(DhcpLease {
                expires_at,
                mac: parts[1].to_string(),
                ip: parts[2].to_string(),
                hostname: (parts[3] != "*").then(|| parts[3].to_string()),
            })
        })
        .collect()
}

/// Split the lease table into surviving text and the count of expired rows.
pub fn partition_expired(text: &str, now_secs: i64) -> (String, usize) {
    let mut kept = String::new();
    let mut removed = 0;

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let expired = parts
            .first()
            .and_then(|t| t.parse::<i64>().ok())
            .map(|expiry| parts.len() >= 4 && expiry <= now_secs)
            .unwrap_or(false);

        if expired {
            removed += 1;
        } else {
            kept.push_str(line);
            kept.push('\n');
        }
    }

    (kept, removed)
}

/// Join leases with stations by case-insensitive MAC.
pub fn join_clients(
    leases: Vec<DhcpLease>,
    stations: &[station::Station],
    interface: &str,
) -> Vec<ClientLease> {
    leases
        .into_iter()
        .map(|lease| {
            let signal = stations
                .iter()
                .find(|s| s.mac.eq_ignore_ascii_case(&lease.mac))
                .and_then(|s| s.signal.clone());
            ClientLease {
                mac: lease.mac,
                ip: lease.ip,
                hostname: lease.hostname,
                signal,
                interface: interface.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::Station;

    const LEASES: &str = "\
1893456000 aa:bb:cc:dd:ee:01 192.168.4.10 phone 01:aa:bb:cc:dd:ee:01
1893456000 AA:BB:CC:DD:EE:02 192.168.4.11 * *
1000 aa:bb:cc:dd:ee:03 192.168.4.12 laptop *
";

    #[test]
    fn test_parse_leases() {
        let leases = parse_leases(LEASES);
        assert_eq!(leases.len(), 3);
        assert_eq!(leases[0].hostname.as_deref(), Some("phone"));
        assert_eq!(leases[1].hostname, None);
        assert_eq!(leases[2].ip, "192.168.4.12");
    }

    #[test]
    fn test_parse_skips_short_lines() {
        assert!(parse_leases("1000 aa:bb\n\n").is_empty());
    }

    #[test]
    fn test_partition_expired() {
        let now = 1_000_000;
        let (kept, removed) = partition_expired(LEASES, now);
        assert_eq!(removed, 1);
        assert!(kept.contains("192.168.4.10"));
        assert!(kept.contains("192.168.4.11"));
        assert!(!kept.contains("192.168.4.12"));
    }

    #[test]
    fn test_partition_keeps_unparseable_lines() {
        let (kept, removed) = partition_expired("# comment line\n", 1_000_000);
        assert_eq!(removed, 0);
        assert_eq!(kept, "# comment line\n");
    }

    #[test]
    fn test_join_is_case_insensitive() {
        let leases = parse_leases(LEASES);
        let stations = vec![Station {
            mac: "aa:bb:cc:dd:ee:02".to_string(),
            signal: Some("-51 dBm".to_string()),
        }];
        let clients = join_clients(leases, &stations, "wlan1");
        assert_eq!(clients[0].signal, None);
        assert_eq!(clients[1].signal.as_deref(), Some("-51 dBm"));
        assert_eq!(clients[1].interface, "wlan1");
    }

    #[tokio::test]
    async fn test_cleanup_rewrites_file() {
        let path = std::env::temp_dir().join(format!("pirouter-leases-{}", std::process::id()));
        tokio::fs::write(&path, LEASES).await.unwrap();

        let cfg = ProbeConfig {
            leases_path: path.to_string_lossy().into_owned(),
            ..ProbeConfig::default()
        };
        let removed = cleanup_expired(&cfg).await.unwrap();
        assert_eq!(removed, 1);

        let rest = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!rest.contains("192.168.4.12"));
        assert_eq!(parse_leases(&rest).len(), 2);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_table_is_unavailable() {
        let cfg = ProbeConfig {
            leases_path: "/nonexistent/dnsmasq.leases".to_string(),
            ..ProbeConfig::default()
        };
        let err = sample_dhcp_leases(&cfg).await.unwrap_err();
        assert!(matches!(err, pirouter_core::ProbeError::Unavailable(_)));
    }
}
