//! Read-only 8x8 board view handed to renderers.

use crate::types::{ColoredPiece, Coord, PieceColor};

/// An 8x8 board plus side to move, indexed by [`Coord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    squares: [[Option<ColoredPiece>; 8]; 8],
    side_to_move: PieceColor,
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            squares: [[None; 8]; 8],
            side_to_move: PieceColor::White,
        }
    }
}

impl BoardSnapshot {
    pub(crate) fn from_squares(
        squares: [[Option<ColoredPiece>; 8]; 8],
        side_to_move: PieceColor,
    ) -> Self {
        Self {
            squares,
            side_to_move,
        }
    }

    /// Parse the placement and side-to-move fields of a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, SnapshotError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(SnapshotError::InvalidFen)?;
        let side_to_move = match fields.next() {
            Some("w") | None => PieceColor::White,
            Some("b") => PieceColor::Black,
            Some(_) => return Err(SnapshotError::InvalidFen),
        };

        let mut squares = [[None; 8]; 8];
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(SnapshotError::InvalidFen);
        }

        for (row, row_str) in rows.iter().enumerate() {
            let mut col = 0usize;
            for c in row_str.chars() {
                if col > 7 {
                    return Err(SnapshotError::InvalidFen);
                }
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    let piece =
                        ColoredPiece::from_fen_char(c).ok_or(SnapshotError::InvalidPiece(c))?;
                    squares[row][col] = Some(piece);
                    col += 1;
                }
            }
        }

        Ok(Self {
            squares,
            side_to_move,
        })
    }

    pub fn piece_at(&self, at: Coord) -> Option<ColoredPiece> {
        if !at.in_bounds() {
            return None;
        }
        self.squares[at.row as usize][at.col as usize]
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.side_to_move
    }

    /// Square holding the king of `color`, if any.
    pub fn king_of(&self, color: PieceColor) -> Option<Coord> {
        Coord::all().find(|&c| {
            self.piece_at(c)
                .is_some_and(|p| p.color == color && p.kind == crate::PieceKind::King)
        })
    }

    /// Render the placement field, for comparing boards without clocks.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (row, squares) in self.squares.iter().enumerate() {
            let mut empty = 0;
            for square in squares {
                match square {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if row < 7 {
                out.push('/');
            }
        }
        out
    }
}

impl std::fmt::Display for BoardSnapshot {
    /// Text diagram with rank labels on the left and files underneath.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, squares) in self.squares.iter().enumerate() {
            write!(f, "{} ", 8 - row)?;
            for square in squares {
                let c = square.map_or('.', |p| p.to_fen_char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("Invalid FEN string")]
    InvalidFen,
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn at(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_starting_position() {
        let board = BoardSnapshot::from_fen(crate::STARTING_FEN).unwrap();
        assert_eq!(
            board.piece_at(at("a1")),
            Some(ColoredPiece::new(PieceKind::Rook, PieceColor::White))
        );
        assert_eq!(
            board.piece_at(at("e1")),
            Some(ColoredPiece::new(PieceKind::King, PieceColor::White))
        );
        assert_eq!(
            board.piece_at(at("d8")),
            Some(ColoredPiece::new(PieceKind::Queen, PieceColor::Black))
        );
        assert_eq!(board.piece_at(at("e4")), None);
        assert_eq!(board.side_to_move(), PieceColor::White);
        assert_eq!(board.king_of(PieceColor::Black), Some(at("e8")));
    }

    #[test]
    fn test_empty_board() {
        let board = BoardSnapshot::from_fen("8/8/8/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(Coord::all().all(|c| board.piece_at(c).is_none()));
        assert_eq!(board.side_to_move(), PieceColor::Black);
        assert_eq!(board.placement(), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn test_placement_matches_fen() {
        let fen = "r3k2r/pp3ppp/8/3Pp3/8/8/PPP2PPP/R3K2R w KQkq e6 0 12";
        let board = BoardSnapshot::from_fen(fen).unwrap();
        assert_eq!(board.placement(), "r3k2r/pp3ppp/8/3Pp3/8/8/PPP2PPP/R3K2R");
    }

    #[test]
    fn test_rejects_bad_piece() {
        assert_eq!(
            BoardSnapshot::from_fen("8/8/8/8/8/8/8/7x w - - 0 1"),
            Err(SnapshotError::InvalidPiece('x'))
        );
    }
}
