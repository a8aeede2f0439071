//! Wire contracts between the client and the game server.
//!
//! The transport itself lives in the host; the engine consumes decoded
//! `NetworkEvent`s and emits outbound messages through a `NetworkSink`.
//! Field names match the server's JSON exactly.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::PlayerId;

/// A player's state as the server broadcasts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePlayer {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_action_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emote_state: Option<String>,
}

/// Outbound position message, sent after every locally accepted movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_action_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emote_state: Option<String>,
}

/// The server's reply to the initial handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub base_height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
}

/// An inbound chat line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub player_id: PlayerId,
    pub content: String,
}

/// Decoded server-to-client events, in arrival order.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// Handshake complete; the payload describes the local player.
    Init(InitPayload),
    /// Full roster broadcast.
    Roster(AHashMap<PlayerId, RemotePlayer>),
    Chat(ChatMessage),
    Disconnect(PlayerId),
}

/// Outbound half of the connection. The host implements this over its
/// actual transport.
pub trait NetworkSink {
    fn send_position(&mut self, update: &PositionUpdate);
}

/// Sink that drops everything; used offline and in tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl NetworkSink for NullSink {
    fn send_position(&mut self, _update: &PositionUpdate) {}
}

/// Sink that records outbound messages for inspection in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub sent: Vec<PositionUpdate>,
}

impl NetworkSink for RecordingSink {
    fn send_position(&mut self, update: &PositionUpdate) {
        self.sent.push(update.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_player_uses_camel_case() {
        let player: RemotePlayer = serde_json::from_str(
            r#"{"x": 10.0, "y": -4.5, "currentActionState": "Swalk", "character": "TheAdventurer"}"#,
        )
        .unwrap();
        assert_eq!(player.current_action_state.as_deref(), Some("Swalk"));
        assert!(player.emote_state.is_none());
    }

    #[test]
    fn test_position_update_omits_absent_fields() {
        let update = PositionUpdate {
            x: 1.0,
            y: 2.0,
            current_action_state: Some("Nwalk".to_string()),
            character: None,
            emote_state: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("currentActionState"));
        assert!(!json.contains("character"));
        assert!(!json.contains("emoteState"));
    }
}
