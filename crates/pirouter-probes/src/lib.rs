//! External system probes for the pirouter control panel.
//!
//! Each probe queries one external subsystem (network manager, wireless
//! tools, OS counters, DHCP lease table, DNS-filter database) under a hard
//! timeout and returns either a populated value or a `ProbeError`. Probes
//! never panic past their boundary and never hang past their timeout; the
//! documented default-on-failure mapping is applied by the aggregation
//! layer, not here, so tests can assert on the mapping.
//!
//! Parsing is kept in pure functions over captured tool output so it can be
//! unit-tested against string fixtures without the tools installed.

pub mod ap;
pub mod config;
pub mod counters;
pub mod dns_filter;
pub mod leases;
pub mod service;
pub mod shell;
pub mod station;
pub mod system;
pub mod wifi;

pub use ap::ApInfo;
pub use config::ProbeConfig;
pub use dns_filter::DnsFilterCounters;
pub use station::Station;
pub use system::SystemProbe;
