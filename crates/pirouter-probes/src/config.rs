//! Probe configuration.

use serde::{Deserialize, Serialize};

/// Configuration for all external probes.
///
/// Interface names and file paths default to the standard appliance layout
/// (wlan0 uplink, wlan1 access point, dnsmasq leases, Pi-hole FTL database);
/// tests point them at fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// WAN-facing wireless interface.
    #[serde(default = "default_wan_iface")]
    pub wan_iface: String,
    /// Client-facing access-point interface.
    #[serde(default = "default_ap_iface")]
    pub ap_iface: String,
    /// Interfaces summed into the WAN counter group.
    #[serde(default = "default_wan_group")]
    pub wan_group: Vec<String>,
    /// Interfaces summed into the AP counter group.
    #[serde(default = "default_ap_group")]
    pub ap_group: Vec<String>,
    /// Interface byte-counter table.
    #[serde(default = "default_counters_path")]
    pub counters_path: String,
    /// dnsmasq lease table.
    #[serde(default = "default_leases_path")]
    pub leases_path: String,
    /// hostapd configuration file.
    #[serde(default = "default_hostapd_conf")]
    pub hostapd_conf: String,
    /// Pi-hole FTL sqlite database.
    #[serde(default = "default_ftl_db_path")]
    pub ftl_db_path: String,
    /// Host pinged for the internet-reachability check.
    #[serde(default = "default_ping_target")]
    pub ping_target: String,
    /// systemd unit backing the access point.
    #[serde(default = "default_ap_service")]
    pub ap_service: String,
    /// systemd unit backing the DNS filter.
    #[serde(default = "default_dns_filter_service")]
    pub dns_filter_service: String,
}

fn default_wan_iface() -> String {
    "wlan0".to_string()
}

fn default_ap_iface() -> String {
    "wlan1".to_string()
}

fn default_wan_group() -> Vec<String> {
    vec!["wlan0".to_string(), "eth0".to_string()]
}

fn default_ap_group() -> Vec<String> {
    vec!["wlan1".to_string(), "br0".to_string()]
}

fn default_counters_path() -> String {
    "/proc/net/dev".to_string()
}

fn default_leases_path() -> String {
    "/var/lib/misc/dnsmasq.leases".to_string()
}

fn default_hostapd_conf() -> String {
    "/etc/hostapd/hostapd.conf".to_string()
}

fn default_ftl_db_path() -> String {
    "/etc/pihole/pihole-FTL.db".to_string()
}

fn default_ping_target() -> String {
    "1.1.1.1".to_string()
}

fn default_ap_service() -> String {
    "hostapd".to_string()
}

fn default_dns_filter_service() -> String {
    "pihole-FTL".to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            wan_iface: default_wan_iface(),
            ap_iface: default_ap_iface(),
            wan_group: default_wan_group(),
            ap_group: default_ap_group(),
            counters_path: default_counters_path(),
            leases_path: default_leases_path(),
            hostapd_conf: default_hostapd_conf(),
            ftl_db_path: default_ftl_db_path(),
            ping_target: default_ping_target(),
            ap_service: default_ap_service(),
            dns_filter_service: default_dns_filter_service(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.wan_group, vec!["wlan0", "eth0"]);
        assert_eq!(cfg.ap_group, vec!["wlan1", "br0"]);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: ProbeConfig = toml::from_str("wan_iface = \"wlp2s0\"").unwrap();
        assert_eq!(cfg.wan_iface, "wlp2s0");
        assert_eq!(cfg.ap_iface, "wlan1");
        assert_eq!(cfg.counters_path, "/proc/net/dev");
    }
}
