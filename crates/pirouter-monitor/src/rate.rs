//! Throughput derivation from absolute byte counters.
//!
//! Each counter group (WAN, AP) keeps the last observed sample and a
//! 3-deep trailing window of per-pair Mbit/s values per direction. A new
//! sample only feeds the window when the elapsed time is inside (1s, 10s)
//! and both byte deltas are non-negative; a rejected sample (interface
//! restart, clock hiccup, duplicate read) leaves the displayed value
//! untouched but still becomes the stored previous sample for the next
//! comparison.

use std::collections::VecDeque;

use parking_lot::Mutex;
use pirouter_core::{CounterGroup, CounterSample, GroupCounters, RateEstimate};

/// Trailing window depth per direction.
const WINDOW: usize = 3;
/// Exclusive bounds on accepted sample spacing, seconds.
const MIN_DT_SECS: f64 = 1.0;
const MAX_DT_SECS: f64 = 10.0;
/// Means below this display as silence.
const NOISE_FLOOR_MBPS: f64 = 0.1;

/// Smoothed per-group rates, Mbit/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupRate {
    pub rx_mbps: f64,
    pub tx_mbps: f64,
}

/// Per-group rate state machine.
#[derive(Debug, Default)]
pub struct GroupTracker {
    prev: Option<(GroupCounters, i64)>,
    rx_window: VecDeque<f64>,
    tx_window: VecDeque<f64>,
    displayed: GroupRate,
}

impl GroupTracker {
    /// Feed one sample; returns the (possibly unchanged) displayed rate.
    pub fn feed(&mut self, counters: GroupCounters, timestamp_ms: i64) -> GroupRate {
        let Some((prev, prev_ts)) = self.prev.replace((counters, timestamp_ms)) else {
            // First sample: baseline only, display stays at zero.
            return self.displayed;
        };

        let dt_secs = (timestamp_ms - prev_ts) as f64 / 1000.0;
        let rx_delta = counters.rx_bytes.checked_sub(prev.rx_bytes);
        let tx_delta = counters.tx_bytes.checked_sub(prev.tx_bytes);

        let accepted = dt_secs > MIN_DT_SECS && dt_secs < MAX_DT_SECS;
        if let (true, Some(rx), Some(tx)) = (accepted, rx_delta, tx_delta) {
            push(&mut self.rx_window, mbps(rx, dt_secs));
            push(&mut self.tx_window, mbps(tx, dt_secs));
            self.displayed = GroupRate {
                rx_mbps: display(&self.rx_window),
                tx_mbps: display(&self.tx_window),
            };
        }

        self.displayed
    }

    pub fn displayed(&self) -> GroupRate {
        self.displayed
    }
}

fn push(window: &mut VecDeque<f64>, value: f64) {
    if window.len() == WINDOW {
        window.pop_front();
    }
    window.push_back(value);
}

fn mbps(delta_bytes: u64, dt_secs: f64) -> f64 {
    (delta_bytes as f64 * 8.0) / (dt_secs * 1_000_000.0)
}

/// Window mean with noise floor: means under 0.1 Mbit/s display as 0.0,
/// everything else rounds to one decimal.
fn display(window: &VecDeque<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    if mean < NOISE_FLOOR_MBPS {
        0.0
    } else {
        (mean * 10.0).round() / 10.0
    }
}

/// Thread-safe rate tracker for both counter groups.
///
/// Shared between the push scheduler (writer) and API handlers (readers).
#[derive(Debug, Default)]
pub struct SpeedTracker {
    wan: Mutex<GroupTracker>,
    ap: Mutex<GroupTracker>,
}

impl SpeedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one counter pass and return the display estimate.
    ///
    /// Download is WAN ingress, upload is AP egress toward clients,
    /// matching what the status bar reports.
    pub fn record(&self, sample: &CounterSample) -> RateEstimate {
        let wan = self.wan.lock().feed(sample.wan, sample.timestamp_ms);
        let ap = self.ap.lock().feed(sample.ap, sample.timestamp_ms);
        RateEstimate {
            download_mbps: wan.rx_mbps,
            upload_mbps: ap.tx_mbps,
        }
    }

    /// Last displayed estimate without feeding a sample.
    pub fn current(&self) -> RateEstimate {
        let wan = self.wan.lock().displayed();
        let ap = self.ap.lock().displayed();
        RateEstimate {
            download_mbps: wan.rx_mbps,
            upload_mbps: ap.tx_mbps,
        }
    }

    /// Displayed rate for one group.
    pub fn group_rate(&self, group: CounterGroup) -> GroupRate {
        match group {
            CounterGroup::Wan => self.wan.lock().displayed(),
            CounterGroup::Ap => self.ap.lock().displayed(),
        }
    }
}
