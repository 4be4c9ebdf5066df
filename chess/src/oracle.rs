//! The local rules oracle.
//!
//! [`MoveOracle`] is the capability the session controller consumes: board
//! contents, legal destinations, terminal-state queries and local move
//! application. [`CozyOracle`] implements it on top of cozy-chess.
//!
//! Promotion is a two-step application. `apply_move` on a promoting pawn
//! leaves the move half-applied and reports [`MoveOutcome::PromotionPending`];
//! the side to move only flips once `apply_promotion` supplies the piece kind.

use cozy_chess::{Board, Move, Piece, Square};
use smallvec::SmallVec;

use crate::fen::{format_fen, parse_fen, FenError};
use crate::notation::{cozy_castling_to_standard, standard_castling_to_cozy};
use crate::snapshot::BoardSnapshot;
use crate::types::{ColoredPiece, Coord, PieceColor, PromotionKind};

/// Destinations reachable from one square. A queen in the open tops out at 27.
pub type Destinations = SmallVec<[Coord; 28]>;

/// Result of a locally accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move is fully applied and the turn has passed.
    Applied,
    /// A pawn reached its last rank; a piece kind must be supplied via
    /// [`MoveOracle::apply_promotion`] before the turn passes.
    PromotionPending { at: Coord },
}

/// Opaque rules capability. Failures are rejections, never panics.
pub trait MoveOracle: Send {
    /// Current board contents (reflects a half-applied promotion move).
    fn board(&self) -> BoardSnapshot;

    fn side_to_move(&self) -> PieceColor;

    fn piece_at(&self, at: Coord) -> Option<ColoredPiece> {
        self.board().piece_at(at)
    }

    /// Legal destinations for the piece on `from`, in board order.
    fn legal_destinations(&self, from: Coord) -> Destinations;

    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    /// Square of `color`'s king.
    fn king_square(&self, color: PieceColor) -> Option<Coord>;

    /// Replace the whole position. Clears any half-applied promotion.
    fn load_position(&mut self, fen: &str) -> Result<(), OracleError>;

    /// Current position as a FEN string.
    fn position_string(&self) -> String;

    fn apply_move(&mut self, from: Coord, to: Coord) -> Result<MoveOutcome, OracleError>;

    fn apply_promotion(&mut self, at: Coord, kind: PromotionKind) -> Result<(), OracleError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] FenError),
    #[error("Illegal move {from}{to}")]
    IllegalMove { from: Coord, to: Coord },
    #[error("Square off the board: ({}, {})", .0.row, .0.col)]
    OffBoard(Coord),
    #[error("A promotion is still waiting for a piece kind")]
    PromotionOutstanding,
    #[error("No promotion pending on {0}")]
    NoPromotionPending(Coord),
}

/// Oracle backed by a cozy-chess [`Board`].
#[derive(Debug, Clone)]
pub struct CozyOracle {
    position: Board,
    /// Origin and destination of a promotion awaiting its piece kind.
    pending_promotion: Option<(Square, Square)>,
}

impl Default for CozyOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl CozyOracle {
    /// Oracle at the standard starting position.
    pub fn new() -> Self {
        Self {
            position: Board::default(),
            pending_promotion: None,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, OracleError> {
        Ok(Self {
            position: parse_fen(fen)?,
            pending_promotion: None,
        })
    }

    fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    fn has_legal_moves(&self) -> bool {
        self.position.generate_moves(|_| true)
    }

    fn in_check(&self) -> bool {
        !self.position.checkers().is_empty()
    }

    fn check_bounds(at: Coord) -> Result<(), OracleError> {
        if at.in_bounds() {
            Ok(())
        } else {
            Err(OracleError::OffBoard(at))
        }
    }
}

impl MoveOracle for CozyOracle {
    fn board(&self) -> BoardSnapshot {
        let mut squares = [[None; 8]; 8];
        for coord in Coord::all() {
            let sq = coord.to_square();
            if let (Some(piece), Some(color)) =
                (self.position.piece_on(sq), self.position.color_on(sq))
            {
                squares[coord.row as usize][coord.col as usize] =
                    Some(ColoredPiece::new(piece.into(), color.into()));
            }
        }

        // Show the pawn on its destination while the kind is being chosen.
        if let Some((from, to)) = self.pending_promotion {
            let from = Coord::from_square(from);
            let to = Coord::from_square(to);
            let pawn = squares[from.row as usize][from.col as usize].take();
            squares[to.row as usize][to.col as usize] = pawn;
        }

        BoardSnapshot::from_squares(squares, self.side_to_move())
    }

    fn side_to_move(&self) -> PieceColor {
        self.position.side_to_move().into()
    }

    fn legal_destinations(&self, from: Coord) -> Destinations {
        if !from.in_bounds() || self.pending_promotion.is_some() {
            return Destinations::new();
        }
        let from_sq = from.to_square();

        let mut destinations: Destinations = self
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from_sq)
            .map(|mv| Coord::from_square(cozy_castling_to_standard(&self.position, mv).to))
            .collect();
        destinations.sort();
        // Four promotion moves share one destination.
        destinations.dedup();
        destinations
    }

    fn is_check(&self) -> bool {
        self.in_check()
    }

    fn is_checkmate(&self) -> bool {
        self.pending_promotion.is_none() && self.in_check() && !self.has_legal_moves()
    }

    fn is_stalemate(&self) -> bool {
        self.pending_promotion.is_none() && !self.in_check() && !self.has_legal_moves()
    }

    fn king_square(&self, color: PieceColor) -> Option<Coord> {
        let color: cozy_chess::Color = color.into();
        let kings = self.position.colored_pieces(color, Piece::King);
        kings.into_iter().next().map(Coord::from_square)
    }

    fn load_position(&mut self, fen: &str) -> Result<(), OracleError> {
        self.position = parse_fen(fen)?;
        self.pending_promotion = None;
        Ok(())
    }

    fn position_string(&self) -> String {
        format_fen(&self.position)
    }

    fn apply_move(&mut self, from: Coord, to: Coord) -> Result<MoveOutcome, OracleError> {
        Self::check_bounds(from)?;
        Self::check_bounds(to)?;
        if self.pending_promotion.is_some() {
            return Err(OracleError::PromotionOutstanding);
        }

        let legal = self.legal_moves();
        let requested = standard_castling_to_cozy(
            Move {
                from: from.to_square(),
                to: to.to_square(),
                promotion: None,
            },
            &legal,
        );

        let promotes = legal
            .iter()
            .any(|mv| mv.from == requested.from && mv.to == requested.to && mv.promotion.is_some());
        if promotes {
            self.pending_promotion = Some((requested.from, requested.to));
            return Ok(MoveOutcome::PromotionPending { at: to });
        }

        if !legal.contains(&requested) {
            return Err(OracleError::IllegalMove { from, to });
        }
        self.position.play_unchecked(requested);
        Ok(MoveOutcome::Applied)
    }

    fn apply_promotion(&mut self, at: Coord, kind: PromotionKind) -> Result<(), OracleError> {
        Self::check_bounds(at)?;
        let (from, to) = match self.pending_promotion {
            Some((from, to)) if Coord::from_square(to) == at => (from, to),
            _ => return Err(OracleError::NoPromotionPending(at)),
        };

        let mv = Move {
            from,
            to,
            promotion: Some(kind.into()),
        };
        self.position
            .try_play(mv)
            .map_err(|_| OracleError::IllegalMove {
                from: Coord::from_square(from),
                to: at,
            })?;
        self.pending_promotion = None;
        Ok(())
    }
}
