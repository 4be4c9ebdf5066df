use chess::{Coord, PieceColor, PromotionKind};

use crate::outcome::GameOutcome;
use crate::realtime::ChatLine;
use crate::snapshot::SessionSnapshot;

/// Events broadcast from the session actor to all subscribers.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum SessionEvent {
    /// The board cache was re-derived; carries the full state.
    BoardRefreshed(SessionSnapshot),
    SelectionChanged {
        selected: Option<Coord>,
        destinations: Vec<Coord>,
    },
    /// Open the promotion chooser.
    PromotionRequested {
        at: Coord,
        color: PieceColor,
        choices: [PromotionKind; 4],
    },
    /// A move was sent to the server.
    MoveSubmitted(String),
    /// The server accepted a move this client sent.
    MoveConfirmed(String),
    /// A move was appended to the history.
    MoveRecorded(String),
    /// Visual hint only: the side to move is in check.
    Check { king: Coord },
    /// Reported once per terminal position.
    GameOver(GameOutcome),
    Chat(ChatLine),
    ChannelStatus { open: bool },
    /// The server refused a locally accepted move; a reload follows.
    Desync(String),
    /// Error notification.
    Error(String),
}
