//! Canonical piece, color and coordinate types for the project.
//! cozy-chess types are internal implementation details.

use std::str::FromStr;

use cozy_chess::{File, Rank, Square};

/// Project-owned piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Project-owned color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    White,
    Black,
}

/// A piece together with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoredPiece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

/// The four kinds a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionKind {
    Queen,
    Rook,
    Knight,
    Bishop,
}

/// A board square addressed as (row, col).
///
/// Row 0 is the eighth rank (Black's back rank), col 0 is the a-file, which is
/// how the board is laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl PieceKind {
    pub fn to_char_upper(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    pub fn to_char_lower(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }
}

impl PieceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl FromStr for PieceColor {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Self::White),
            "black" | "b" => Ok(Self::Black),
            _ => Err(ParseCoordError::InvalidColor(s.to_string())),
        }
    }
}

impl ColoredPiece {
    pub fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn to_fen_char(self) -> char {
        match self.color {
            PieceColor::White => self.kind.to_char_upper(),
            PieceColor::Black => self.kind.to_char_lower(),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = PieceKind::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        Some(Self { kind, color })
    }
}

impl PromotionKind {
    /// Chooser order: queen, rook, knight, bishop.
    pub const ALL: [PromotionKind; 4] = [Self::Queen, Self::Rook, Self::Knight, Self::Bishop];

    /// One-character lowercase suffix used in move notation.
    pub fn suffix(self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Knight => 'n',
            Self::Bishop => 'b',
        }
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(Self::Queen),
            'r' => Some(Self::Rook),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            _ => None,
        }
    }

    pub fn piece_kind(self) -> PieceKind {
        match self {
            Self::Queen => PieceKind::Queen,
            Self::Rook => PieceKind::Rook,
            Self::Knight => PieceKind::Knight,
            Self::Bishop => PieceKind::Bishop,
        }
    }
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Option<Self> {
        (row < 8 && col < 8).then_some(Self { row, col })
    }

    pub fn in_bounds(self) -> bool {
        self.row < 8 && self.col < 8
    }

    /// File letter, `a`..=`h`.
    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    /// Rank digit, `1`..=`8`.
    pub fn rank_char(self) -> char {
        (b'1' + (7 - self.row)) as char
    }

    pub(crate) fn to_square(self) -> Square {
        Square::new(File::ALL[self.col as usize], Rank::ALL[7 - self.row as usize])
    }

    pub(crate) fn from_square(sq: Square) -> Self {
        Self {
            row: 7 - sq.rank() as u8,
            col: sq.file() as u8,
        }
    }

    /// Every square, row by row from the top-left corner.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Coord { row, col }))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseCoordError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ParseCoordError::InvalidSquare(s.to_string()));
        }
        Ok(Coord {
            row: 7 - (rank - b'1'),
            col: file - b'a',
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCoordError {
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

impl From<cozy_chess::Piece> for PieceKind {
    fn from(p: cozy_chess::Piece) -> Self {
        match p {
            cozy_chess::Piece::Pawn => Self::Pawn,
            cozy_chess::Piece::Knight => Self::Knight,
            cozy_chess::Piece::Bishop => Self::Bishop,
            cozy_chess::Piece::Rook => Self::Rook,
            cozy_chess::Piece::Queen => Self::Queen,
            cozy_chess::Piece::King => Self::King,
        }
    }
}

impl From<PromotionKind> for cozy_chess::Piece {
    fn from(p: PromotionKind) -> Self {
        match p {
            PromotionKind::Queen => Self::Queen,
            PromotionKind::Rook => Self::Rook,
            PromotionKind::Knight => Self::Knight,
            PromotionKind::Bishop => Self::Bishop,
        }
    }
}

impl From<cozy_chess::Color> for PieceColor {
    fn from(c: cozy_chess::Color) -> Self {
        match c {
            cozy_chess::Color::White => Self::White,
            cozy_chess::Color::Black => Self::Black,
        }
    }
}

impl From<PieceColor> for cozy_chess::Color {
    fn from(c: PieceColor) -> Self {
        match c {
            PieceColor::White => Self::White,
            PieceColor::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char_upper())
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for PromotionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Queen => "Queen",
            Self::Rook => "Rook",
            Self::Knight => "Knight",
            Self::Bishop => "Bishop",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_algebraic() {
        let e2: Coord = "e2".parse().unwrap();
        assert_eq!(e2, Coord { row: 6, col: 4 });
        assert_eq!(e2.to_string(), "e2");

        let a8: Coord = "a8".parse().unwrap();
        assert_eq!(a8, Coord { row: 0, col: 0 });
        assert!("i9".parse::<Coord>().is_err());
        assert!("e".parse::<Coord>().is_err());
    }

    #[test]
    fn test_coord_square_mapping() {
        for coord in Coord::all() {
            assert_eq!(Coord::from_square(coord.to_square()), coord);
        }
        let h1: Coord = "h1".parse().unwrap();
        assert_eq!(h1.to_square(), Square::new(File::H, Rank::First));
    }

    #[test]
    fn test_promotion_suffixes() {
        let suffixes: String = PromotionKind::ALL.iter().map(|k| k.suffix()).collect();
        assert_eq!(suffixes, "qrnb");
        for kind in PromotionKind::ALL {
            assert_eq!(PromotionKind::from_suffix(kind.suffix()), Some(kind));
        }
        assert_eq!(PromotionKind::from_suffix('k'), None);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("white".parse::<PieceColor>().unwrap(), PieceColor::White);
        assert_eq!("Black".parse::<PieceColor>().unwrap(), PieceColor::Black);
        assert!("".parse::<PieceColor>().is_err());
        assert_eq!(PieceColor::White.opposite(), PieceColor::Black);
    }
}
