//! Service seams for the server boundary.
//!
//! Implemented by the real HTTP/WebSocket clients and by the mocks.

use crate::error::ClientResult;
use crate::protocol::{ChannelEvent, GameState, JoinedGame, MatchStatus, MoveAccepted, NewGame};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Request/response game API.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// `POST /login` (form-encoded). On success the session cookie is kept
    /// for every later call.
    async fn login(&self, username: &str, password: &str) -> ClientResult<()>;

    /// `POST /game/new`
    async fn create_game(&self) -> ClientResult<NewGame>;

    /// `GET /game/{id}`
    async fn get_game(&self, game_id: &str) -> ClientResult<GameState>;

    /// `POST /game/{id}/move` with a move in wire notation.
    async fn submit_move(&self, game_id: &str, mv: &str) -> ClientResult<MoveAccepted>;

    /// `POST /game/{id}/join`
    async fn join_game(&self, game_id: &str) -> ClientResult<JoinedGame>;

    /// `POST /matchmaking/find`
    async fn find_match(&self) -> ClientResult<MatchStatus>;

    /// `GET /matchmaking/status`
    async fn match_status(&self) -> ClientResult<MatchStatus>;
}

/// An open realtime channel.
///
/// `events` yields decoded frames and ends when the connection drops;
/// `outgoing` accepts chat text to be framed and sent.
#[derive(Debug)]
pub struct ChannelHandle {
    pub events: mpsc::Receiver<ChannelEvent>,
    pub outgoing: mpsc::Sender<String>,
}

/// Opens the realtime channel for a game.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn open(&self, game_id: &str) -> ClientResult<ChannelHandle>;
}
