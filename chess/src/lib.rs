//! Chess rules for the chessroom client.
//!
//! Wraps cozy-chess behind the [`MoveOracle`] capability the session
//! controller consumes, plus the small value types shared with the wire layer.

pub mod fen;
pub mod notation;
pub mod oracle;
pub mod snapshot;
pub mod types;

pub use fen::{FenError, STARTING_FEN};
pub use notation::{MoveNotation, NotationError};
pub use oracle::{CozyOracle, Destinations, MoveOracle, MoveOutcome, OracleError};
pub use snapshot::{BoardSnapshot, SnapshotError};
pub use types::{ColoredPiece, Coord, ParseCoordError, PieceColor, PieceKind, PromotionKind};
