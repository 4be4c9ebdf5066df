//! Starting a session: fetch the game, load it, open the channel, spawn the actor.

use std::sync::Arc;

use chess::{MoveOracle, PieceColor};
use chess_client::{ChannelConnector, GameApi};
use tokio::sync::{broadcast, mpsc};

use crate::actor::run_session_actor;
use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::{SessionError, SessionResult};
use crate::handle::SessionHandle;
use crate::state::SessionState;

/// Start a session for `game_id`.
///
/// Fails if the game cannot be fetched, the server assigned no color, or the
/// position is unreadable. A channel that cannot be opened is not fatal: the
/// session runs with chat disabled and no push updates.
pub async fn start_session(
    game_id: &str,
    api: Arc<dyn GameApi>,
    connector: &dyn ChannelConnector,
    oracle: Box<dyn MoveOracle>,
    config: &SessionConfig,
) -> SessionResult<SessionHandle> {
    let game = api
        .get_game(game_id)
        .await
        .map_err(|e| SessionError::Bootstrap(e.to_string()))?;

    let local_color: PieceColor = game.player_color.parse().map_err(|_| {
        SessionError::Bootstrap(format!(
            "server assigned no color (got {:?})",
            game.player_color
        ))
    })?;

    let (event_tx, _) = broadcast::channel(config.event_buffer);
    let mut state = SessionState::new(
        SessionContext::new(game_id, local_color),
        oracle,
        config.chat_log_capacity,
        event_tx,
    );
    state
        .load_game(&game)
        .map_err(|e| SessionError::Bootstrap(e.to_string()))?;

    let channel = match connector.open(game_id).await {
        Ok(channel) => Some(channel),
        Err(e) => {
            tracing::warn!(game_id, "Realtime channel unavailable, chat disabled: {}", e);
            None
        }
    };

    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    tokio::spawn(run_session_actor(state, cmd_rx, channel, api));
    tracing::info!(game_id, color = %local_color, "Session started");

    Ok(SessionHandle::new(game_id.to_string(), local_color, cmd_tx))
}
