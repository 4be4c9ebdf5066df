use chess::{Coord, MoveNotation, PieceColor, PromotionKind};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::commands::SessionCommand;
use crate::error::{SessionError, SessionResult};
use crate::events::SessionEvent;
use crate::selection::ClickOutcome;
use crate::snapshot::SessionSnapshot;

/// Cheap, cloneable handle to a session actor.
#[derive(Clone)]
pub struct SessionHandle {
    game_id: String,
    local_color: PieceColor,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(
        game_id: String,
        local_color: PieceColor,
        cmd_tx: mpsc::Sender<SessionCommand>,
    ) -> Self {
        Self {
            game_id,
            local_color,
            cmd_tx,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn local_color(&self) -> PieceColor {
        self.local_color
    }

    /// Click a board square.
    pub async fn click(&self, at: Coord) -> SessionResult<ClickOutcome> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Click { at, reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Pick the piece for a pending promotion. Returns the notation sent.
    pub async fn choose_promotion(&self, kind: PromotionKind) -> SessionResult<MoveNotation> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::ChoosePromotion { kind, reply: tx })
            .await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn send_chat(&self, text: impl Into<String>) -> SessionResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::SendChat {
            text: text.into(),
            reply: tx,
        })
        .await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Ask for a fresh copy of the game from the server. The result arrives
    /// as a [`SessionEvent::BoardRefreshed`].
    pub async fn reload(&self) -> SessionResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Reload { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn get_snapshot(&self) -> SessionResult<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetSnapshot { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn subscribe(
        &self,
    ) -> SessionResult<(SessionSnapshot, broadcast::Receiver<SessionEvent>)> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Subscribe { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
    }

    async fn send(&self, cmd: SessionCommand) -> SessionResult<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::Closed)
    }
}
