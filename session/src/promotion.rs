//! Pawn promotion sub-flow.

use chess::{Coord, MoveNotation, PieceColor, PromotionKind};

/// Offered in this order.
pub const PROMOTION_CHOICES: [PromotionKind; 4] = PromotionKind::ALL;

/// A promotion waiting for the player to pick a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionContext {
    pub origin: Coord,
    pub destination: Coord,
    pub color: PieceColor,
    pub chosen: Option<PromotionKind>,
}

impl PromotionContext {
    pub fn new(origin: Coord, destination: Coord, color: PieceColor) -> Self {
        Self {
            origin,
            destination,
            color,
            chosen: None,
        }
    }

    /// Record the choice and return the combined notation, e.g. `e7e8q`.
    pub fn choose(&mut self, kind: PromotionKind) -> MoveNotation {
        self.chosen = Some(kind);
        MoveNotation::new(self.origin, self.destination).with_promotion(kind)
    }
}
