//! Core domain types for the pirouter control panel.
//!
//! This crate provides the value types shared by the probe, monitor and
//! dashboard layers:
//! - `StatusSnapshot`, `StatsSnapshot`: per-sample dashboard read-models
//! - `WifiLinkInfo`: uplink association state
//! - `CounterSample`, `GroupCounters`: raw interface byte counters
//! - `RateEstimate`: smoothed throughput derived from counter deltas
//! - `ClientLease`: DHCP lease joined with station signal data

pub mod error;
pub mod types;

pub use error::{ProbeError, Result};
pub use types::{
    Band, ClientLease, CounterGroup, CounterSample, DhcpLease, GroupCounters, RateEstimate,
    StatsSnapshot, StatusSnapshot, WifiLinkInfo,
};
