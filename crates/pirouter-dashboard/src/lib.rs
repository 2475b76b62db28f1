//! Web surface of the pirouter control panel.
//!
//! An axum HTTP server exposing the read-model endpoints under `/api/*`
//! plus a WebSocket at `/ws` that pushes one frame per topic every few
//! seconds. New WebSocket clients receive an initial burst of all topics
//! so the UI paints immediately.
//!
//! Both surfaces share one
//! [`StatusAggregator`](pirouter_monitor::StatusAggregator): REST handlers
//! read through its coalescing caches to bound probe load under rapid
//! polling, while the push scheduler samples live so pushed frames always
//! reflect a fresh pass.

mod broadcast;
mod config;
mod server;
mod types;

pub use broadcast::run_push_scheduler;
pub use config::DashboardConfig;
pub use server::run_server;
pub use types::{ClientList, PushMessage};
