//! Wire move notation (`e2e4`, `e7e8q`) and castling conversion.

use std::str::FromStr;

use cozy_chess::{File, Move, Piece, Rank, Square};

use crate::types::{Coord, PromotionKind};

/// A move as the server accepts it: origin, destination and an optional
/// promotion suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveNotation {
    pub from: Coord,
    pub to: Coord,
    pub promotion: Option<PromotionKind>,
}

impl MoveNotation {
    pub fn new(from: Coord, to: Coord) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PromotionKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

impl std::fmt::Display for MoveNotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.suffix())?;
        }
        Ok(())
    }
}

impl FromStr for MoveNotation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(NotationError::InvalidLength(s.to_string()));
        }
        let from = s[0..2]
            .parse()
            .map_err(|_| NotationError::InvalidSquare(s[0..2].to_string()))?;
        let to = s[2..4]
            .parse()
            .map_err(|_| NotationError::InvalidSquare(s[2..4].to_string()))?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => Some(PromotionKind::from_suffix(c).ok_or(NotationError::InvalidPromotion(c))?),
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("Move must be 4 or 5 characters: {0:?}")]
    InvalidLength(String),
    #[error("Invalid square in move: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion suffix: {0}")]
    InvalidPromotion(char),
}

/// Convert king-two-squares castling (e1g1, e1c1, e8g8, e8c8) to cozy_chess's
/// king-takes-rook form (e1h1, e1a1, e8h8, e8a8).
///
/// Only rewrites when the converted move is actually legal, so an ordinary
/// king step from e1 to g1 in an odd position is left alone.
pub(crate) fn standard_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let rook_file = if mv.to.file() == File::G {
            File::H
        } else {
            File::A
        };
        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };
        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Inverse of [`standard_castling_to_cozy`]: a king moving onto its own rook
/// becomes the king-two-squares destination.
pub(crate) fn cozy_castling_to_standard(board: &cozy_chess::Board, mv: Move) -> Move {
    let moving_king = board.piece_on(mv.from) == Some(Piece::King);
    let onto_own_rook = board.piece_on(mv.to) == Some(Piece::Rook)
        && board.color_on(mv.to) == board.color_on(mv.from);

    if moving_king && onto_own_rook {
        let file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
            File::G
        } else {
            File::C
        };
        return Move {
            from: mv.from,
            to: Square::new(file, mv.from.rank()),
            promotion: None,
        };
    }

    mv
}
