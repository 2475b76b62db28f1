//! HTTP server implementation using axum.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use pirouter_core::{RateEstimate, StatsSnapshot, StatusSnapshot, WifiLinkInfo};
use pirouter_monitor::{aggregator::available_channels, StatusAggregator};
use pirouter_probes::ApInfo;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::broadcast::{collect_frames, run_push_scheduler};
use crate::config::DashboardConfig;
use crate::types::ClientList;

/// Connection limiter to prevent too many concurrent WebSocket connections.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    pub fn try_acquire(&self) -> Option<ConnectionGuard<'_>> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionGuard { limiter: self });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

pub struct ConnectionGuard<'a> {
    limiter: &'a ConnectionLimiter,
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<StatusAggregator>,
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
}

impl AppState {
    pub fn new(
        aggregator: Arc<StatusAggregator>,
        broadcast_tx: broadcast::Sender<String>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            aggregator,
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
        }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/stats", get(get_stats))
        .route("/api/wifi", get(get_wifi))
        .route("/api/clients", get(get_clients))
        .route("/api/speed", get(get_speed))
        .route("/api/ap", get(get_ap))
        .route("/api/cleanup_clients", post(cleanup_clients))
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.aggregator.status().await)
}

async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.aggregator.stats().await)
}

async fn get_wifi(State(state): State<AppState>) -> Json<WifiLinkInfo> {
    Json(state.aggregator.wifi().await)
}

async fn get_clients(State(state): State<AppState>) -> Json<ClientList> {
    Json(ClientList::new(state.aggregator.clients().await))
}

async fn get_speed(State(state): State<AppState>) -> Json<RateEstimate> {
    Json(state.aggregator.current_speed())
}

/// Access-point settings plus the channels selectable for its band.
#[derive(Debug, Clone, Serialize)]
struct ApSettings {
    #[serde(flatten)]
    info: ApInfo,
    channels: &'static [&'static str],
}

async fn get_ap(State(state): State<AppState>) -> Json<ApSettings> {
    let info = state.aggregator.ap_info().await;
    let channels = available_channels(info.band);
    Json(ApSettings { info, channels })
}

/// Result of an operator-triggered lease sweep.
#[derive(Debug, Clone, Serialize)]
struct CleanupResult {
    removed: usize,
}

/// Remove expired DHCP leases from the lease table.
///
/// Operator action, not scheduler work: the table is only rewritten when
/// explicitly requested, and the caller gets the removed count back.
async fn cleanup_clients(State(state): State<AppState>) -> Response {
    match state.aggregator.cleanup_expired_leases().await {
        Ok(removed) => {
            info!(removed, "expired leases removed");
            Json(CleanupResult { removed }).into_response()
        }
        Err(e) => {
            warn!(error = %e, "lease cleanup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "lease cleanup failed").into_response()
        }
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    // Reject before upgrading; the slot itself is acquired inside the
    // connection task so the guard lives with the socket.
    if state.connection_limiter.try_acquire().is_none() {
        warn!(
            current = state.connection_limiter.current_count(),
            "WebSocket connection limit reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
    }

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let _guard = match state.connection_limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!("connection limit reached during upgrade");
            return;
        }
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "WebSocket connection opened"
    );

    let (mut sender, mut receiver) = socket.split();
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    // Initial burst: one frame per topic so the UI paints without waiting
    // for the next scheduled round.
    for msg in collect_frames(&state.aggregator).await {
        let Ok(json) = serde_json::to_string(&msg) else {
            continue;
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            debug!("client disconnected during initial burst");
            return;
        }
    }

    // Drain incoming frames for close detection; pong replies are handled
    // by axum itself.
    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(frame) => {
                        if sender.send(Message::Text(frame.into())).await.is_err() {
                            debug!("client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("incoming task completed, closing connection");
                break;
            }
        }
    }

    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Run the dashboard server until the shutdown token fires.
pub async fn run_server(
    aggregator: Arc<StatusAggregator>,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // One push round every few seconds and five frames per round; a small
    // buffer absorbs slow clients without unbounded memory.
    let (broadcast_tx, _) = broadcast::channel::<String>(32);

    let state = AppState::new(aggregator.clone(), broadcast_tx.clone(), &config);
    let app = create_router(state);

    tokio::spawn(run_push_scheduler(
        aggregator,
        broadcast_tx,
        config.push_interval_secs,
        shutdown.clone(),
    ));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(%addr, "starting dashboard server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_caps_connections() {
        let limiter = ConnectionLimiter::new(2);
        let a = limiter.try_acquire();
        let b = limiter.try_acquire();
        assert!(a.is_some());
        assert!(b.is_some());
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.current_count(), 2);

        drop(a);
        assert!(limiter.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_cleanup_endpoint_removes_and_reports() {
        use pirouter_probes::ProbeConfig;
        use std::time::Duration;

        let path = std::env::temp_dir().join(format!("pirouter-srv-{}", std::process::id()));
        tokio::fs::write(
            &path,
            "1000 aa:bb:cc:dd:ee:03 192.168.4.12 laptop *\n\
             1893456000 aa:bb:cc:dd:ee:01 192.168.4.10 phone *\n",
        )
        .await
        .unwrap();

        let cfg = ProbeConfig {
            leases_path: path.to_string_lossy().into_owned(),
            ..ProbeConfig::default()
        };
        let aggregator = Arc::new(pirouter_monitor::StatusAggregator::new(
            cfg,
            Duration::from_secs(5),
        ));
        let (tx, _rx) = broadcast::channel(32);
        let state = AppState::new(aggregator, tx, &DashboardConfig::default());

        let response = cleanup_clients(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"{\"removed\":1}");

        let rest = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(rest.contains("192.168.4.10"));
        assert!(!rest.contains("192.168.4.12"));
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[test]
    fn test_ap_settings_serialization() {
        let settings = ApSettings {
            info: ApInfo::default(),
            channels: available_channels(pirouter_core::Band::FiveGhz),
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"band\":\"5G\""));
        assert!(json.contains("\"channels\":[\"36\",\"40\",\"44\",\"48\"]"));
    }
}
