//! Local mirror of the position, always re-derived from the oracle.

use chess::fen::normalize_fen;
use chess::{BoardSnapshot, MoveOracle, OracleError, PieceColor};

/// What the view renders. Fields are only ever written by re-reading the
/// oracle; nothing patches the board in place.
#[derive(Debug, Clone, Default)]
pub struct BoardStateCache {
    position: String,
    turn: Option<PieceColor>,
    board: BoardSnapshot,
    /// Last position string delivered by the server, as delivered.
    authoritative: String,
}

impl BoardStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any authoritative position has arrived yet.
    pub fn is_loaded(&self) -> bool {
        self.turn.is_some()
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn turn(&self) -> Option<PieceColor> {
        self.turn
    }

    pub fn board(&self) -> &BoardSnapshot {
        &self.board
    }

    /// Re-derive position, turn and board from the oracle.
    pub fn refresh_from(&mut self, oracle: &dyn MoveOracle) {
        self.position = oracle.position_string();
        self.turn = Some(oracle.side_to_move());
        self.board = oracle.board();
    }

    /// Load a server position into the oracle, then refresh from it and
    /// remember it as the known-good position. On failure nothing changes.
    pub fn accept_authoritative(
        &mut self,
        oracle: &mut dyn MoveOracle,
        fen: &str,
    ) -> Result<(), OracleError> {
        oracle.load_position(fen)?;
        self.authoritative = normalize_fen(fen);
        self.refresh_from(oracle);
        Ok(())
    }

    /// Adopt `fen` as the known-good position without reloading the oracle.
    /// Used when the server confirms the position already on screen.
    pub fn confirm(&mut self, fen: &str) {
        self.authoritative = normalize_fen(fen);
    }

    /// Put the oracle back on the last known-good position, discarding any
    /// speculative or half-applied move.
    pub fn restore(&mut self, oracle: &mut dyn MoveOracle) -> Result<(), OracleError> {
        if !self.is_loaded() {
            return Ok(());
        }
        oracle.load_position(&self.authoritative)?;
        self.refresh_from(oracle);
        Ok(())
    }

    /// True when `fen` describes the position already shown, either in the
    /// server's rendering or the oracle's.
    pub fn is_current(&self, fen: &str) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let fen = normalize_fen(fen);
        fen == self.authoritative || fen == normalize_fen(&self.position)
    }

    /// True when `fen` is the last position the server delivered.
    pub fn is_authoritative(&self, fen: &str) -> bool {
        self.is_loaded() && normalize_fen(fen) == self.authoritative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{CozyOracle, Coord, STARTING_FEN};

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    #[test]
    fn test_empty_cache_is_not_loaded() {
        let cache = BoardStateCache::new();
        assert!(!cache.is_loaded());
        assert!(!cache.is_current(STARTING_FEN));
    }

    #[test]
    fn test_accept_authoritative_refreshes() {
        let mut oracle = CozyOracle::new();
        let mut cache = BoardStateCache::new();
        cache.accept_authoritative(&mut oracle, AFTER_E4).unwrap();

        assert!(cache.is_loaded());
        assert_eq!(cache.turn(), Some(PieceColor::Black));
        assert_eq!(cache.position(), oracle.position_string());
        assert!(cache.board().piece_at("e4".parse().unwrap()).is_some());
        assert!(cache.is_current(AFTER_E4));
        assert!(cache.is_current("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR   b KQkq - 0 1"));
        assert!(!cache.is_current(STARTING_FEN));
    }

    #[test]
    fn test_bad_position_leaves_cache_untouched() {
        let mut oracle = CozyOracle::new();
        let mut cache = BoardStateCache::new();
        cache.accept_authoritative(&mut oracle, STARTING_FEN).unwrap();

        assert!(cache.accept_authoritative(&mut oracle, "garbage").is_err());
        assert!(cache.is_current(STARTING_FEN));
        assert_eq!(cache.turn(), Some(PieceColor::White));
    }

    #[test]
    fn test_restore_discards_local_move() {
        let mut oracle = CozyOracle::new();
        let mut cache = BoardStateCache::new();
        cache.accept_authoritative(&mut oracle, STARTING_FEN).unwrap();

        let e2: Coord = "e2".parse().unwrap();
        let e4: Coord = "e4".parse().unwrap();
        oracle.apply_move(e2, e4).unwrap();
        assert_eq!(oracle.side_to_move(), PieceColor::Black);

        cache.restore(&mut oracle).unwrap();
        assert_eq!(oracle.side_to_move(), PieceColor::White);
        assert!(oracle.piece_at(e2).is_some());
        assert_eq!(cache.position(), oracle.position_string());
    }

    #[test]
    fn test_speculative_refresh_keeps_restore_point() {
        let mut oracle = CozyOracle::new();
        let mut cache = BoardStateCache::new();
        cache.accept_authoritative(&mut oracle, STARTING_FEN).unwrap();

        let e4: Coord = "e4".parse().unwrap();
        oracle.apply_move("e2".parse().unwrap(), e4).unwrap();
        cache.refresh_from(&oracle);

        assert_eq!(cache.turn(), Some(PieceColor::Black));
        assert!(cache.board().piece_at(e4).is_some());
        assert!(cache.is_current(&oracle.position_string()));
        assert!(!cache.is_authoritative(&oracle.position_string()));
        assert!(cache.is_authoritative(STARTING_FEN));

        cache.restore(&mut oracle).unwrap();
        assert!(cache.board().piece_at(e4).is_none());
        assert_eq!(cache.turn(), Some(PieceColor::White));
    }

    #[test]
    fn test_confirm_moves_restore_point() {
        let mut oracle = CozyOracle::new();
        let mut cache = BoardStateCache::new();
        cache.accept_authoritative(&mut oracle, STARTING_FEN).unwrap();

        oracle
            .apply_move("e2".parse().unwrap(), "e4".parse().unwrap())
            .unwrap();
        cache.refresh_from(&oracle);
        cache.confirm(AFTER_E4);
        assert!(cache.is_authoritative(AFTER_E4));

        cache.restore(&mut oracle).unwrap();
        assert_eq!(oracle.side_to_move(), PieceColor::Black);
        assert!(oracle.piece_at("e4".parse().unwrap()).is_some());
    }
}
