//! Wire message types for the WebSocket push channel and REST API.

use pirouter_core::{ClientLease, RateEstimate, StatsSnapshot, StatusSnapshot, WifiLinkInfo};
use serde::Serialize;

/// Connected-client payload, shared between the push frame and the REST
/// endpoint so both surfaces serve the same shape.
#[derive(Debug, Clone, Serialize)]
pub struct ClientList {
    pub clients: Vec<ClientLease>,
    /// Derived count, carried alongside the list for the UI's summary
    /// badges.
    pub count: usize,
}

impl ClientList {
    pub fn new(clients: Vec<ClientLease>) -> Self {
        let count = clients.len();
        Self { clients, count }
    }
}

/// One pushed frame. The tag is the topic name the web UI subscribes to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    SystemStatus(StatusSnapshot),
    SystemStats(StatsSnapshot),
    WifiStatus(WifiLinkInfo),
    SpeedData(RateEstimate),
    ClientList(ClientList),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_tags() {
        let msg = PushMessage::SystemStatus(StatusSnapshot::default());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"system_status\""));
        assert!(json.contains("\"uptime\":\"unknown\""));

        let msg = PushMessage::SpeedData(RateEstimate {
            download_mbps: 12.5,
            upload_mbps: 2.0,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"speed_data\""));
        assert!(json.contains("\"download_mbps\":12.5"));
    }

    #[test]
    fn test_client_list_tag_and_shape() {
        let msg = PushMessage::ClientList(ClientList::new(vec![]));
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, "{\"type\":\"client_list\",\"clients\":[],\"count\":0}");
    }

    #[test]
    fn test_client_list_count_tracks_clients() {
        let list = ClientList::new(vec![ClientLease {
            mac: "aa:bb:cc:dd:ee:01".to_string(),
            ip: "192.168.4.10".to_string(),
            hostname: Some("phone".to_string()),
            signal: None,
            interface: "wlan1".to_string(),
        }]);
        assert_eq!(list.count, 1);

        let json = serde_json::to_string(&list).unwrap();
        assert!(json.contains("\"count\":1"));
        assert!(json.contains("\"mac\":\"aa:bb:cc:dd:ee:01\""));
    }

    #[test]
    fn test_wifi_frame_omits_absent_fields() {
        let msg = PushMessage::WifiStatus(WifiLinkInfo::disconnected());
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, "{\"type\":\"wifi_status\",\"connected\":false}");
    }
}
