//! Access-point configuration probe.
//!
//! Parses the hostapd configuration for the AP settings card: SSID, band,
//! channel and SSID visibility. The passphrase is never exposed; only a
//! star mask of its length leaves this module.

use pirouter_core::{Band, ProbeError, Result};
use serde::Serialize;

use crate::config::ProbeConfig;

/// Access-point configuration as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApInfo {
    pub ssid: String,
    pub band: Band,
    pub channel: String,
    pub ssid_visible: bool,
    /// Passphrase masked to its length.
    pub password_masked: String,
}

impl Default for ApInfo {
    fn default() -> Self {
        Self {
            ssid: "unknown".to_string(),
            band: Band::FiveGhz,
            channel: "?".to_string(),
            ssid_visible: true,
            password_masked: "******".to_string(),
        }
    }
}

/// Read and parse the hostapd configuration.
pub async fn sample_ap_info(cfg: &ProbeConfig) -> Result<ApInfo> {
    let text = match tokio::fs::read_to_string(&cfg.hostapd_conf).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProbeError::Unavailable(cfg.hostapd_conf.clone()))
        }
        Err(e) => return Err(ProbeError::Io(e)),
    };
    Ok(parse_hostapd(&text))
}

/// Parse `key=value` hostapd lines; unknown keys are ignored and missing
/// keys keep their defaults.
pub fn parse_hostapd(text: &str) -> ApInfo {
    let mut info = ApInfo::default();

    for line in text.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key {
            "ssid" => info.ssid = value.to_string(),
            // hw_mode a = 5 GHz, anything else (g/b) = 2.4 GHz
            "hw_mode" => {
                info.band = if value == "a" {
                    Band::FiveGhz
                } else {
                    Band::TwoGhz
                }
            }
            "channel" => info.channel = value.to_string(),
            // 0 = broadcast, 1/2 = hidden
            "ignore_broadcast_ssid" => info.ssid_visible = value == "0",
            "wpa_passphrase" => {
                info.password_masked = "*".repeat(value.trim_matches('"').chars().count())
            }
            _ => {}
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTAPD: &str = "\
interface=wlan1
ssid=PiRepeater
hw_mode=a
channel=36
ignore_broadcast_ssid=0
wpa_passphrase=hunter2pass
";

    #[test]
    fn test_parse_hostapd() {
        let info = parse_hostapd(HOSTAPD);
        assert_eq!(info.ssid, "PiRepeater");
        assert_eq!(info.band, Band::FiveGhz);
        assert_eq!(info.channel, "36");
        assert!(info.ssid_visible);
        assert_eq!(info.password_masked, "***********");
    }

    #[test]
    fn test_parse_hostapd_2g_hidden() {
        let info = parse_hostapd("hw_mode=g\nchannel=6\nignore_broadcast_ssid=1\n");
        assert_eq!(info.band, Band::TwoGhz);
        assert_eq!(info.channel, "6");
        assert!(!info.ssid_visible);
    }

    #[test]
    fn test_parse_empty_keeps_defaults() {
        let info = parse_hostapd("# nothing here\n");
        assert_eq!(info, ApInfo::default());
    }
}
