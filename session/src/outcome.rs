//! End-of-game evaluation, notified once per terminal position.

use chess::{Coord, MoveOracle, PieceColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Draw,
    /// The side that delivered mate (or that the server declared the winner).
    Win(PieceColor),
}

impl GameOutcome {
    /// Stalemate is a draw; checkmate is won by the side not to move.
    pub fn from_oracle(oracle: &dyn MoveOracle) -> Option<Self> {
        if oracle.is_stalemate() {
            Some(GameOutcome::Draw)
        } else if oracle.is_checkmate() {
            Some(GameOutcome::Win(oracle.side_to_move().opposite()))
        } else {
            None
        }
    }

    /// Parse a server result string. `"*"` and unknown values mean play goes on.
    pub fn from_server(result: &str) -> Option<Self> {
        match result.trim() {
            "1-0" => Some(GameOutcome::Win(PieceColor::White)),
            "0-1" => Some(GameOutcome::Win(PieceColor::Black)),
            "1/2-1/2" => Some(GameOutcome::Draw),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::Draw => write!(f, "Draw"),
            GameOutcome::Win(color) => write!(f, "{} wins", color),
        }
    }
}

/// Remembers which position was last reported so repeat refreshes of the
/// same terminal position stay silent.
#[derive(Debug, Clone, Default)]
pub struct OutcomeNotifier {
    notified_for: Option<String>,
    outcome: Option<GameOutcome>,
}

impl OutcomeNotifier {
    /// Evaluate `position` and return the outcome if it has not been reported
    /// for this position yet. The oracle's verdict wins over the server's.
    /// A live position clears any earlier result.
    pub fn evaluate(
        &mut self,
        position: &str,
        oracle: &dyn MoveOracle,
        server_result: Option<&str>,
    ) -> Option<GameOutcome> {
        let Some(outcome) = GameOutcome::from_oracle(oracle)
            .or_else(|| server_result.and_then(GameOutcome::from_server))
        else {
            self.notified_for = None;
            self.outcome = None;
            return None;
        };
        if self.notified_for.as_deref() == Some(position) {
            return None;
        }
        self.notified_for = Some(position.to_string());
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// The last reported outcome, if the game has ended.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }
}

/// King square to highlight when the side to move is in check.
pub fn check_hint(oracle: &dyn MoveOracle) -> Option<Coord> {
    if oracle.is_check() {
        oracle.king_square(oracle.side_to_move())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{CozyOracle, STARTING_FEN};

    const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

    #[test]
    fn test_checkmate_won_by_mating_side() {
        let oracle = CozyOracle::from_fen(FOOLS_MATE).unwrap();
        assert_eq!(
            GameOutcome::from_oracle(&oracle),
            Some(GameOutcome::Win(PieceColor::Black))
        );
        assert_eq!(check_hint(&oracle), Some("e1".parse().unwrap()));
    }

    #[test]
    fn test_stalemate_is_draw() {
        let oracle = CozyOracle::from_fen(STALEMATE).unwrap();
        assert_eq!(GameOutcome::from_oracle(&oracle), Some(GameOutcome::Draw));
        assert_eq!(check_hint(&oracle), None);
    }

    #[test]
    fn test_notified_once_per_position() {
        let oracle = CozyOracle::from_fen(STALEMATE).unwrap();
        let mut notifier = OutcomeNotifier::default();
        assert_eq!(
            notifier.evaluate(STALEMATE, &oracle, None),
            Some(GameOutcome::Draw)
        );
        assert_eq!(notifier.evaluate(STALEMATE, &oracle, None), None);
        assert_eq!(notifier.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_live_position_clears_outcome() {
        let mut notifier = OutcomeNotifier::default();
        let ended = CozyOracle::from_fen(STALEMATE).unwrap();
        notifier.evaluate(STALEMATE, &ended, None);

        let live = CozyOracle::from_fen(STARTING_FEN).unwrap();
        assert_eq!(notifier.evaluate(STARTING_FEN, &live, None), None);
        assert_eq!(notifier.outcome(), None);

        assert_eq!(
            notifier.evaluate(STALEMATE, &ended, None),
            Some(GameOutcome::Draw)
        );
    }

    #[test]
    fn test_server_result_used_when_board_is_live() {
        let oracle = CozyOracle::from_fen(STARTING_FEN).unwrap();
        let mut notifier = OutcomeNotifier::default();
        assert_eq!(notifier.evaluate(STARTING_FEN, &oracle, Some("*")), None);
        assert_eq!(
            notifier.evaluate(STARTING_FEN, &oracle, Some("1/2-1/2")),
            Some(GameOutcome::Draw)
        );
        assert_eq!(GameOutcome::from_server("0-1"), Some(GameOutcome::Win(PieceColor::Black)));
    }
}
