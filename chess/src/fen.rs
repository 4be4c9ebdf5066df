use cozy_chess::Board;

use crate::types::PieceColor;

/// Standard chess starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let normalized = normalize_fen(fen);
    if normalized.is_empty() {
        return Err(FenError::InvalidFormat);
    }
    if normalized.split(' ').next().map(|p| p.split('/').count()) != Some(8) {
        return Err(FenError::InvalidBoardLayout);
    }

    normalized.parse().map_err(|_| FenError::InvalidFormat)
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

/// Collapse runs of whitespace so two renderings of one position compare equal.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The piece placement field (first field) of a FEN string.
pub fn placement(fen: &str) -> Option<&str> {
    fen.split_whitespace().next()
}

/// The side-to-move field of a FEN string.
pub fn side_to_move(fen: &str) -> Option<PieceColor> {
    match fen.split_whitespace().nth(1)? {
        "w" => Some(PieceColor::White),
        "b" => Some(PieceColor::Black),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout")]
    InvalidBoardLayout,
}
