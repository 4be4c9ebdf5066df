//! JSON wire types for the REST API and the realtime channel.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// `POST /game/new` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    #[serde(rename = "gameID")]
    pub game_id: String,
    pub fen: String,
}

/// `GET /game/{id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub fen: String,
    /// `"white"`, `"black"`, or empty for spectators.
    #[serde(default)]
    pub player_color: String,
    #[serde(default)]
    pub move_history: Option<Vec<String>>,
    #[serde(default)]
    pub state: Option<String>,
}

/// `POST /game/{id}/join` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedGame {
    #[serde(rename = "gameID")]
    pub game_id: String,
    pub fen: String,
    pub color: String,
}

/// `POST /game/{id}/move` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub mv: String,
}

/// Successful `POST /game/{id}/move` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveAccepted {
    #[serde(rename = "newFEN")]
    pub new_fen: String,
    /// `"1-0"`, `"0-1"`, `"1/2-1/2"`, or empty/`"*"` while the game goes on.
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub turn: Option<String>,
}

/// Structured error body returned with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Matchmaking poll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatus {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "gameID", default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MatchStatus {
    /// Game id once an opponent has been found.
    pub fn found_game(&self) -> Option<&str> {
        (self.status == "found").then_some(self.game_id.as_deref()).flatten()
    }
}

/// Authoritative position broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateUpdate {
    #[serde(alias = "newFEN")]
    pub new_position: String,
    #[serde(default)]
    pub last_move: Option<String>,
    #[serde(default)]
    pub mover: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
}

/// Chat line relayed through the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Option<String>,
}

/// A decoded incoming channel frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    GameState(GameStateUpdate),
    Chat(ChatMessage),
}

/// Envelope shared by every text frame: `{ type, payload, sender? }`.
#[derive(Debug, Deserialize)]
struct IncomingEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default)]
    sender: Option<String>,
}

/// Outgoing chat frame: `{ type: "chat", payload, gameID }`.
#[derive(Debug, Serialize)]
struct OutgoingChat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: &'a str,
    #[serde(rename = "gameID")]
    game_id: &'a str,
}

pub const GAME_STATE_UPDATE: &str = "gameStateUpdate";
pub const CHAT: &str = "chat";

impl ChannelEvent {
    /// Decode one text frame.
    pub fn decode(frame: &str) -> ClientResult<Self> {
        let envelope: IncomingEnvelope = serde_json::from_str(frame)?;
        match envelope.kind.as_str() {
            GAME_STATE_UPDATE => {
                let mut update: GameStateUpdate = serde_json::from_value(envelope.payload)?;
                if update.mover.is_none() {
                    update.mover = envelope.sender;
                }
                Ok(ChannelEvent::GameState(update))
            }
            CHAT => {
                let text = match envelope.payload {
                    serde_json::Value::String(text) => text,
                    other => {
                        return Err(ClientError::InvalidData(format!(
                            "chat payload is not a string: {}",
                            other
                        )))
                    }
                };
                Ok(ChannelEvent::Chat(ChatMessage {
                    text,
                    sender: envelope.sender,
                }))
            }
            other => Err(ClientError::InvalidData(format!(
                "unknown channel message type: {}",
                other
            ))),
        }
    }
}

/// Encode an outgoing chat frame for `game_id`.
pub fn encode_chat(game_id: &str, text: &str) -> ClientResult<String> {
    Ok(serde_json::to_string(&OutgoingChat {
        kind: CHAT,
        payload: text,
        game_id,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_game_state_update() {
        let frame = r#"{"type":"gameStateUpdate","payload":{"newPosition":"8/8/8/8/8/8/8/K6k b - - 0 1","lastMove":"a2a1"},"sender":"bob"}"#;
        let event = ChannelEvent::decode(frame).unwrap();
        assert_eq!(
            event,
            ChannelEvent::GameState(GameStateUpdate {
                new_position: "8/8/8/8/8/8/8/K6k b - - 0 1".to_string(),
                last_move: Some("a2a1".to_string()),
                mover: Some("bob".to_string()),
                outcome: None,
            })
        );
    }

    #[test]
    fn test_decode_server_move_response_payload() {
        // The server reuses its move response as the broadcast payload.
        let frame = r#"{"type":"gameStateUpdate","gameID":"g1","payload":{"gameID":"g1","status":"ok","newFEN":"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1","outcome":"*","turn":"Black"}}"#;
        match ChannelEvent::decode(frame).unwrap() {
            ChannelEvent::GameState(update) => {
                assert!(update.new_position.starts_with("rnbqkbnr/pppppppp/8/8/4P3"));
                assert_eq!(update.outcome.as_deref(), Some("*"));
                assert_eq!(update.last_move, None);
            }
            other => panic!("expected game state, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_chat() {
        let frame = r#"{"type":"chat","payload":"alice: hi"}"#;
        assert_eq!(
            ChannelEvent::decode(frame).unwrap(),
            ChannelEvent::Chat(ChatMessage {
                text: "alice: hi".to_string(),
                sender: None,
            })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_type_and_bad_json() {
        assert!(matches!(
            ChannelEvent::decode(r#"{"type":"resign","payload":{}}"#),
            Err(ClientError::InvalidData(_))
        ));
        assert!(matches!(
            ChannelEvent::decode("not json"),
            Err(ClientError::Decode(_))
        ));
        assert!(matches!(
            ChannelEvent::decode(r#"{"type":"chat","payload":{"text":"x"}}"#),
            Err(ClientError::InvalidData(_))
        ));
    }

    #[test]
    fn test_encode_chat() {
        let frame = encode_chat("g42", "good game").unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "chat");
        assert_eq!(value["payload"], "good game");
        assert_eq!(value["gameID"], "g42");
    }

    #[test]
    fn test_game_state_optional_fields() {
        let state: GameState =
            serde_json::from_str(r#"{"fen":"8/8/8/8/8/8/8/K6k w - - 0 1","playerColor":"black"}"#)
                .unwrap();
        assert_eq!(state.player_color, "black");
        assert_eq!(state.move_history, None);
    }

    #[test]
    fn test_match_status_found() {
        let status: MatchStatus =
            serde_json::from_str(r#"{"status":"found","gameID":"abc"}"#).unwrap();
        assert_eq!(status.found_game(), Some("abc"));
        let searching: MatchStatus = serde_json::from_str(r#"{"status":"searching"}"#).unwrap();
        assert_eq!(searching.found_game(), None);
    }
}
