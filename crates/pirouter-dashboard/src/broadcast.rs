//! Periodic push scheduler.
//!
//! On every tick the scheduler samples the interface counters (feeding the
//! speed tracker), collects the five topic frames from one live sampling
//! pass that bypasses the aggregator's caches, and fans them out on the
//! broadcast channel. A tick that finds no connected receivers is normal
//! and not an error. The loop stops when the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use pirouter_monitor::StatusAggregator;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::types::{ClientList, PushMessage};

/// Run the push loop until cancelled.
pub async fn run_push_scheduler(
    aggregator: Arc<StatusAggregator>,
    tx: broadcast::Sender<String>,
    interval_secs: u64,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    info!(interval_secs, "push scheduler started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("push scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                push_round(&aggregator, &tx).await;
            }
        }
    }
}

async fn push_round(aggregator: &StatusAggregator, tx: &broadcast::Sender<String>) {
    for msg in collect_frames(aggregator).await {
        match serde_json::to_string(&msg) {
            Ok(json) => match tx.send(json) {
                Ok(receivers) => trace!(receivers, "frame pushed"),
                Err(_) => trace!("no receivers connected"),
            },
            Err(e) => debug!(error = %e, "frame serialization failed"),
        }
    }
}

/// Collect one frame per topic from a single live sampling pass, bypassing
/// the aggregator's caches so every round reflects fresh probe state. Also
/// used for the initial burst a new WebSocket client receives on connect.
pub async fn collect_frames(aggregator: &StatusAggregator) -> Vec<PushMessage> {
    let speed = aggregator.record_speed_sample().await;
    let (status, stats, wifi, clients) = tokio::join!(
        aggregator.sample_status(),
        aggregator.sample_stats(),
        aggregator.sample_wifi(),
        aggregator.sample_clients(),
    );

    vec![
        PushMessage::SystemStatus(status),
        PushMessage::SystemStats(stats),
        PushMessage::WifiStatus(wifi),
        PushMessage::SpeedData(speed),
        PushMessage::ClientList(ClientList::new(clients)),
    ]
}
