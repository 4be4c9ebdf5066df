use chess::{BoardSnapshot, Coord, PieceColor};

use crate::outcome::GameOutcome;
use crate::realtime::ChatLine;

/// Complete, immutable view of session state.
/// Sent with every board refresh and on subscribe.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub game_id: String,
    pub local_color: PieceColor,
    pub position: String,
    /// `None` until the first authoritative position arrives.
    pub turn: Option<PieceColor>,
    pub board: BoardSnapshot,
    pub selected: Option<Coord>,
    pub destinations: Vec<Coord>,
    /// Mirrors the processing lock.
    pub processing: bool,
    /// Square of a promotion waiting for a piece choice.
    pub promotion: Option<Coord>,
    pub check: Option<Coord>,
    pub outcome: Option<GameOutcome>,
    pub history: Vec<String>,
    pub chat: Vec<ChatLine>,
    pub channel_open: bool,
}

impl SessionSnapshot {
    /// Whether it is this client's turn.
    pub fn is_local_turn(&self) -> bool {
        self.turn == Some(self.local_color)
    }
}
