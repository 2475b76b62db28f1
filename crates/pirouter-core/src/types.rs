//! Dashboard value types.
//!
//! All snapshot types are immutable values produced fresh on every sample;
//! none of them carry persisted identity. They serialize to the flat
//! key/value shapes the web UI consumes.

use serde::{Deserialize, Serialize};

/// Connectivity flags plus uptime text, produced once per sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// WAN-facing wireless interface has an active association.
    pub wifi: bool,
    /// Internet reachable (single ping to the probe target).
    pub internet: bool,
    /// Access point service is active.
    pub ap: bool,
    /// DNS filter service is active.
    pub dns_filter: bool,
    /// Human-readable uptime ("up 3 days, 2 hours").
    pub uptime: String,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            wifi: false,
            internet: false,
            ap: false,
            dns_filter: false,
            uptime: "unknown".to_string(),
        }
    }
}

/// Resource and DNS-filter metrics, produced once per sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// CPU utilization percent, rounded.
    pub cpu: u32,
    /// Memory utilization percent, rounded.
    pub memory: u32,
    /// SoC temperature in Celsius, rounded. 0 when unreadable.
    pub temperature: u32,
    /// Stations currently attached to the access point.
    pub clients: u32,
    /// Disk used, GB with one decimal.
    pub disk_used: f64,
    /// Disk free, GB with one decimal.
    pub disk_free: f64,
    /// Disk total, GB with one decimal.
    pub disk_total: f64,
    /// Total DNS queries seen by the filter.
    pub dns_queries: u64,
    /// Queries blocked by the filter.
    pub dns_blocked: u64,
    /// Blocked percentage, one decimal.
    pub dns_blocked_percent: f64,
}

/// WAN uplink association state.
///
/// `signal` may be stale: if the signal scan times out while the association
/// check succeeded, the probe still reports `connected: true` with a sentinel
/// signal of 0 rather than failing the whole probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiLinkInfo {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    /// Signal strength percent as reported by the scan (0-100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<u8>,
}

impl WifiLinkInfo {
    /// The disconnected value, used both as probe output and failure default.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ssid: None,
            signal: None,
        }
    }
}

/// Logical counter group for traffic accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterGroup {
    /// Internet-facing interfaces.
    Wan,
    /// Client-facing interfaces.
    Ap,
}

impl CounterGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterGroup::Wan => "wan",
            CounterGroup::Ap => "ap",
        }
    }
}

/// Byte counters summed over one group's member interfaces.
///
/// Counters are monotonic but may reset when an interface restarts; rate
/// derivation rejects the resulting negative deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// One pass over the interface counter table.
///
/// Both groups share a timestamp because they are read in the same pass;
/// rate derivation for a group needs two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSample {
    pub wan: GroupCounters,
    pub ap: GroupCounters,
    /// Capture time, Unix milliseconds.
    pub timestamp_ms: i64,
}

impl CounterSample {
    pub fn group(&self, group: CounterGroup) -> GroupCounters {
        match group {
            CounterGroup::Wan => self.wan,
            CounterGroup::Ap => self.ap,
        }
    }
}

/// Smoothed throughput estimate, Mbit/s with one decimal.
///
/// Derived over a short trailing window of valid counter deltas; never
/// persisted beyond the smoothing window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

/// One row of the DHCP lease table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpLease {
    /// Lease expiry, Unix seconds. Not in the future means expired.
    pub expires_at: i64,
    pub mac: String,
    pub ip: String,
    /// None when the client did not report a hostname ("*" in the table).
    pub hostname: Option<String>,
}

impl DhcpLease {
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at <= now_secs
    }
}

/// A connected client: DHCP lease enriched with station signal strength.
///
/// MAC is the join key between the lease table and the station dump,
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLease {
    pub mac: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Raw signal text from the station dump (e.g. "-54 dBm"), if associated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    /// Interface tag the client is attached through.
    pub interface: String,
}

/// Access-point frequency band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2G")]
    TwoGhz,
    #[default]
    #[serde(rename = "5G")]
    FiveGhz,
}
