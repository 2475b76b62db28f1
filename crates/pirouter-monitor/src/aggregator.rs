//! Probe composition into the UI read-models.
//!
//! The aggregator is the one place where probe failures turn into the
//! documented default values: a failed probe degrades its own fields and
//! nothing else, and the substitution is logged with the probe name. Cached
//! getters sit in front of the live `sample_*` methods so rapid UI polling
//! cannot multiply probe invocations; the push scheduler calls the
//! `sample_*` paths directly, bypassing the caches, so pushed frames always
//! come from a fresh pass.

use std::time::Duration;

use pirouter_core::{Band, ClientLease, RateEstimate, StatsSnapshot, StatusSnapshot, WifiLinkInfo};
use pirouter_probes::{ap, counters, dns_filter, leases, service, station, system, wifi};
use pirouter_probes::{ApInfo, ProbeConfig, SystemProbe};
use tracing::{debug, warn};

use crate::cache::CoalescingCache;
use crate::rate::SpeedTracker;

/// Cache keys are a closed set; one per read-model.
const KEY_STATUS: &str = "status";
const KEY_STATS: &str = "stats";
const KEY_WIFI: &str = "wifi";
const KEY_CLIENTS: &str = "clients";
const KEY_AP_INFO: &str = "ap_info";

/// Selectable channels per band, as offered by the AP settings card.
pub fn available_channels(band: Band) -> &'static [&'static str] {
    match band {
        Band::TwoGhz => &["1", "6", "11"],
        Band::FiveGhz => &["36", "40", "44", "48"],
    }
}

/// Composes probe results into status, stats, wifi and client views.
pub struct StatusAggregator {
    cfg: ProbeConfig,
    system: SystemProbe,
    speed: SpeedTracker,
    status_cache: CoalescingCache<StatusSnapshot>,
    stats_cache: CoalescingCache<StatsSnapshot>,
    wifi_cache: CoalescingCache<WifiLinkInfo>,
    clients_cache: CoalescingCache<Vec<ClientLease>>,
    ap_info_cache: CoalescingCache<ApInfo>,
}

impl StatusAggregator {
    pub fn new(cfg: ProbeConfig, ttl: Duration) -> Self {
        Self {
            cfg,
            system: SystemProbe::new(),
            speed: SpeedTracker::new(),
            status_cache: CoalescingCache::new(ttl),
            stats_cache: CoalescingCache::new(ttl),
            wifi_cache: CoalescingCache::new(ttl),
            clients_cache: CoalescingCache::new(ttl),
            ap_info_cache: CoalescingCache::new(ttl),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.cfg
    }

    /// Connectivity status, cached.
    pub async fn status(&self) -> StatusSnapshot {
        self.status_cache
            .get_or_compute(KEY_STATUS, || self.sample_status())
            .await
    }

    /// Resource and DNS-filter stats, cached.
    pub async fn stats(&self) -> StatsSnapshot {
        self.stats_cache
            .get_or_compute(KEY_STATS, || self.sample_stats())
            .await
    }

    /// WAN uplink state, cached.
    pub async fn wifi(&self) -> WifiLinkInfo {
        self.wifi_cache
            .get_or_compute(KEY_WIFI, || self.sample_wifi())
            .await
    }

    /// Connected clients, cached.
    pub async fn clients(&self) -> Vec<ClientLease> {
        self.clients_cache
            .get_or_compute(KEY_CLIENTS, || self.sample_clients())
            .await
    }

    /// Access-point configuration, cached.
    pub async fn ap_info(&self) -> ApInfo {
        self.ap_info_cache
            .get_or_compute(KEY_AP_INFO, || self.sample_ap_info())
            .await
    }

    /// Sample the counter table and fold it into the speed tracker.
    ///
    /// Called by the push scheduler on its cadence; a failed read leaves the
    /// tracker untouched and returns the last displayed estimate.
    pub async fn record_speed_sample(&self) -> RateEstimate {
        match counters::sample_interface_counters(&self.cfg).await {
            Ok(sample) => self.speed.record(&sample),
            Err(e) => {
                debug!(error = %e, "counter sample failed, keeping displayed rates");
                self.speed.current()
            }
        }
    }

    /// Last displayed throughput estimate, without sampling.
    pub fn current_speed(&self) -> RateEstimate {
        self.speed.current()
    }

    /// Remove expired leases from the lease table and drop the cached
    /// client view so the next read reflects the rewrite.
    pub async fn cleanup_expired_leases(&self) -> pirouter_core::Result<usize> {
        let removed = leases::cleanup_expired(&self.cfg).await?;
        if removed > 0 {
            self.clients_cache.invalidate(KEY_CLIENTS);
        }
        Ok(removed)
    }

    /// Live connectivity status, bypassing the cache.
    ///
    /// The push scheduler uses the `sample_*` paths so pushed frames always
    /// reflect a fresh pass; the cached getters are for request handlers.
    pub async fn sample_status(&self) -> StatusSnapshot {
        let (assoc, internet, ap_active, dns_active, uptime) = tokio::join!(
            wifi::sample_association(&self.cfg),
            system::sample_internet_reachable(&self.cfg.ping_target),
            service::sample_service_active(&self.cfg.ap_service),
            service::sample_service_active(&self.cfg.dns_filter_service),
            system::sample_uptime(),
        );

        StatusSnapshot {
            wifi: or_default(assoc, "association", false),
            internet: or_default(internet, "ping", false),
            ap: or_default(ap_active, "ap_service", false),
            dns_filter: or_default(dns_active, "dns_filter_service", false),
            uptime: or_default(uptime, "uptime", "unknown".to_string()),
        }
    }

    /// Live resource and DNS-filter stats, bypassing the cache.
    pub async fn sample_stats(&self) -> StatsSnapshot {
        let (temperature, stations, dns) = tokio::join!(
            system::sample_temperature(),
            station::sample_station_dump(&self.cfg),
            dns_filter::sample_dns_counters(&self.cfg.ftl_db_path),
        );

        let host = self.system.sample_host_stats();
        let dns = or_default(dns, "dns_filter", Default::default());

        StatsSnapshot {
            cpu: host.cpu_percent,
            memory: host.memory_percent,
            temperature: or_default(temperature, "temperature", 0),
            clients: or_default(stations.map(|s| s.len() as u32), "station_dump", 0),
            disk_used: host.disk_used_gb,
            disk_free: host.disk_free_gb,
            disk_total: host.disk_total_gb,
            dns_queries: dns.queries,
            dns_blocked: dns.blocked,
            dns_blocked_percent: dns.blocked_percent,
        }
    }

    /// Live WAN uplink state, bypassing the cache.
    pub async fn sample_wifi(&self) -> WifiLinkInfo {
        or_default(
            wifi::sample_wifi_link(&self.cfg).await,
            "wifi_link",
            WifiLinkInfo::disconnected(),
        )
    }

    /// Live connected-client view, bypassing the cache.
    pub async fn sample_clients(&self) -> Vec<ClientLease> {
        or_default(
            leases::sample_ap_clients(&self.cfg).await,
            "ap_clients",
            Vec::new(),
        )
    }

    async fn sample_ap_info(&self) -> ApInfo {
        or_default(
            ap::sample_ap_info(&self.cfg).await,
            "ap_info",
            ApInfo::default(),
        )
    }
}

/// Substitute the documented default for a failed probe, logging the probe
/// name so degradation shows up in the logs rather than vanishing.
fn or_default<T>(result: pirouter_core::Result<T>, probe: &'static str, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(probe, error = %e, "probe failed, substituting default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pirouter_core::ProbeError;

    #[test]
    fn test_available_channels() {
        assert_eq!(available_channels(Band::TwoGhz), &["1", "6", "11"]);
        assert_eq!(available_channels(Band::FiveGhz), &["36", "40", "44", "48"]);
    }

    #[test]
    fn test_or_default_passes_ok_through() {
        assert_eq!(or_default(Ok(7u32), "test", 0), 7);
    }

    #[test]
    fn test_or_default_substitutes_on_error() {
        let failed: pirouter_core::Result<u32> =
            Err(ProbeError::Unavailable("nmcli".to_string()));
        assert_eq!(or_default(failed, "test", 42), 42);
    }

    fn offline_config() -> ProbeConfig {
        ProbeConfig {
            counters_path: "/nonexistent/net/dev".to_string(),
            leases_path: "/nonexistent/dnsmasq.leases".to_string(),
            hostapd_conf: "/nonexistent/hostapd.conf".to_string(),
            ftl_db_path: "/nonexistent/pihole-FTL.db".to_string(),
            ..ProbeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_clients_default_to_empty_without_lease_table() {
        let agg = StatusAggregator::new(offline_config(), Duration::from_secs(5));
        assert!(agg.clients().await.is_empty());
    }

    #[tokio::test]
    async fn test_ap_info_defaults_without_hostapd_conf() {
        let agg = StatusAggregator::new(offline_config(), Duration::from_secs(5));
        assert_eq!(agg.ap_info().await, ApInfo::default());
    }

    #[tokio::test]
    async fn test_stats_dns_fields_default_to_zero() {
        let agg = StatusAggregator::new(offline_config(), Duration::from_secs(5));
        let stats = agg.stats().await;
        assert_eq!(stats.dns_queries, 0);
        assert_eq!(stats.dns_blocked, 0);
        assert_eq!(stats.dns_blocked_percent, 0.0);
    }

    #[tokio::test]
    async fn test_speed_sample_failure_keeps_displayed_zero() {
        let agg = StatusAggregator::new(offline_config(), Duration::from_secs(5));
        let estimate = agg.record_speed_sample().await;
        assert_eq!(estimate, RateEstimate::default());
        assert_eq!(agg.current_speed(), RateEstimate::default());
    }
}
