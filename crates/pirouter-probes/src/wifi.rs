//! WAN uplink association and signal probes.
//!
//! The association check and the signal scan carry asymmetric timeouts on
//! purpose: asking the network manager for active connections is cheap and
//! reliable, while a signal scan touches the radio and may legitimately
//! stall. If the scan times out after a successful association check, the
//! probe still reports `connected: true` with a sentinel signal of 0 rather
//! than failing the whole probe.

use pirouter_core::{Result, WifiLinkInfo};
use tracing::debug;

use crate::config::ProbeConfig;
use crate::shell;

/// Timeout for the active-connection check.
const ASSOC_TIMEOUT_SECS: u64 = 5;
/// Shorter timeout for the best-effort signal scan.
const SCAN_TIMEOUT_SECS: u64 = 3;

/// Sample the uplink: association state plus best-effort signal strength.
pub async fn sample_wifi_link(cfg: &ProbeConfig) -> Result<WifiLinkInfo> {
    let active = shell::run(
        "nmcli",
        &["-t", "-f", "name,device,state", "con", "show", "--active"],
        ASSOC_TIMEOUT_SECS,
    )
    .await?;

    if !active.success {
        return Ok(WifiLinkInfo::disconnected());
    }

    let ssid = match parse_active_connection(&active.stdout, &cfg.wan_iface) {
        Some(name) => name,
        None => return Ok(WifiLinkInfo::disconnected()),
    };

    let signal = match shell::run(
        "nmcli",
        &["-t", "-f", "ssid,signal", "dev", "wifi", "list", "ifname", &cfg.wan_iface],
        SCAN_TIMEOUT_SECS,
    )
    .await
    {
        Ok(scan) if scan.success => parse_signal_scan(&scan.stdout, &ssid).unwrap_or(0),
        Ok(_) => 0,
        Err(e) => {
            // Association is established; a stalled scan degrades the signal
            // reading only, reported as sentinel 0.
            debug!(error = %e, "signal scan failed, reporting sentinel 0");
            0
        }
    };

    Ok(WifiLinkInfo {
        connected: true,
        ssid: Some(ssid),
        signal: Some(signal),
    })
}

/// Sample association state only (no signal scan).
///
/// Used by the status view, which needs the boolean but not the scan cost.
pub async fn sample_association(cfg: &ProbeConfig) -> Result<bool> {
    let active = shell::run(
        "nmcli",
        &["-t", "-f", "name,device,state", "con", "show", "--active"],
        ASSOC_TIMEOUT_SECS,
    )
    .await?;

    Ok(active.success && parse_active_connection(&active.stdout, &cfg.wan_iface).is_some())
}

/// Find the connection name bound to `device` in `nmcli -t con show --active`
/// output (`name:device:state` per line).
pub fn parse_active_connection(output: &str, device: &str) -> Option<String> {
    for line in output.lines() {
        let mut parts = line.splitn(3, ':');
        let name = parts.next()?;
        let dev = parts.next()?;
        let state = parts.next().unwrap_or("");
        if dev == device && (state.contains("activated") || state.contains("connected")) {
            return Some(name.to_string());
        }
    }
    None
}

/// Find the signal percent for `ssid` in `nmcli -t dev wifi list` output
/// (`ssid:signal` per line). Colons cannot appear in the signal column, so
/// splitting from the right keeps SSIDs containing colons intact.
pub fn parse_signal_scan(output: &str, ssid: &str) -> Option<u8> {
    for line in output.lines() {
        if let Some((name, signal)) = line.rsplit_once(':') {
            if name == ssid {
                return signal.trim().parse().ok();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE: &str = "HomeNet:wlan0:activated\nPiRepeater:wlan1:activated\nlo:lo:connected (externally)";

    #[test]
    fn test_parse_active_connection() {
        assert_eq!(
            parse_active_connection(ACTIVE, "wlan0"),
            Some("HomeNet".to_string())
        );
        assert_eq!(
            parse_active_connection(ACTIVE, "wlan1"),
            Some("PiRepeater".to_string())
        );
        assert_eq!(parse_active_connection(ACTIVE, "eth0"), None);
    }

    #[test]
    fn test_parse_active_connection_ignores_inactive_states() {
        let output = "HomeNet:wlan0:deactivating";
        assert_eq!(parse_active_connection(output, "wlan0"), None);
    }

    #[test]
    fn test_parse_signal_scan() {
        let output = "HomeNet:87\nNeighbor:45\n:30";
        assert_eq!(parse_signal_scan(output, "HomeNet"), Some(87));
        assert_eq!(parse_signal_scan(output, "Neighbor"), Some(45));
        assert_eq!(parse_signal_scan(output, "Unknown"), None);
    }

    #[test]
    fn test_parse_signal_scan_ssid_with_colon() {
        let output = "cafe:guest:62";
        assert_eq!(parse_signal_scan(output, "cafe:guest"), Some(62));
    }

    #[test]
    fn test_parse_signal_scan_garbage_signal() {
        let output = "HomeNet:n/a";
        assert_eq!(parse_signal_scan(output, "HomeNet"), None);
    }
}
