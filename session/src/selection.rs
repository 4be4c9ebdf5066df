//! Square selection and the outcome of a board click.

use chess::{Coord, Destinations, MoveNotation, MoveOracle, PieceColor};

/// Why a click had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No authoritative position has been delivered yet.
    NotLoaded,
    /// A move is being synchronized with the server.
    MoveInFlight,
    /// The promotion chooser is open.
    PromotionActive,
    /// Nothing selected and the square holds no selectable piece.
    NothingToSelect,
}

/// Observable result of one click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored(IgnoreReason),
    Selected { at: Coord, destinations: Vec<Coord> },
    Deselected,
    /// The move was accepted locally and handed to the server.
    MoveStarted(MoveNotation),
    /// The move reached the last rank; a piece kind must be chosen.
    PromotionRequested { at: Coord },
    /// The oracle refused the move.
    LocallyRejected(MoveNotation),
}

/// What the selection machine decided; the session acts on `Target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectionStep {
    Selected,
    Deselected,
    Unselectable,
    Target { from: Coord, to: Coord },
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: Option<Coord>,
    destinations: Destinations,
}

impl SelectionState {
    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    pub fn destinations(&self) -> &[Coord] {
        &self.destinations
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.destinations.clear();
    }

    /// Advance the machine for a click on `at`.
    pub(crate) fn click(
        &mut self,
        at: Coord,
        oracle: &dyn MoveOracle,
        local_color: PieceColor,
    ) -> SelectionStep {
        if let Some(from) = self.selected {
            if from == at {
                self.clear();
                return SelectionStep::Deselected;
            }
            if self.destinations.contains(&at) {
                self.clear();
                return SelectionStep::Target { from, to: at };
            }
            if self.try_select(at, oracle, local_color) {
                return SelectionStep::Selected;
            }
            self.clear();
            return SelectionStep::Deselected;
        }

        if self.try_select(at, oracle, local_color) {
            SelectionStep::Selected
        } else {
            SelectionStep::Unselectable
        }
    }

    /// Select `at` if it holds a piece of `local_color` on that color's turn.
    fn try_select(&mut self, at: Coord, oracle: &dyn MoveOracle, local_color: PieceColor) -> bool {
        let own_piece = oracle
            .piece_at(at)
            .is_some_and(|piece| piece.color == local_color);
        if !own_piece || oracle.side_to_move() != local_color {
            return false;
        }
        self.selected = Some(at);
        self.destinations = oracle.legal_destinations(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::CozyOracle;

    fn at(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_selection_matches_oracle_for_every_square() {
        let oracle = CozyOracle::new();
        for square in Coord::all() {
            let mut selection = SelectionState::default();
            let step = selection.click(square, &oracle, PieceColor::White);
            let own = oracle
                .piece_at(square)
                .is_some_and(|p| p.color == PieceColor::White);
            if own {
                assert_eq!(step, SelectionStep::Selected);
                assert_eq!(
                    selection.destinations(),
                    oracle.legal_destinations(square).as_slice()
                );
            } else {
                assert_eq!(step, SelectionStep::Unselectable);
                assert!(selection.destinations().is_empty());
            }
        }
    }

    #[test]
    fn test_no_selection_off_turn() {
        let oracle = CozyOracle::new();
        let mut selection = SelectionState::default();
        // Black to move only after white plays.
        assert_eq!(
            selection.click(at("e7"), &oracle, PieceColor::Black),
            SelectionStep::Unselectable
        );
        assert_eq!(selection.selected(), None);
        assert!(selection.destinations().is_empty());
    }

    #[test]
    fn test_transitions() {
        let oracle = CozyOracle::new();
        let mut selection = SelectionState::default();

        assert_eq!(
            selection.click(at("e2"), &oracle, PieceColor::White),
            SelectionStep::Selected
        );
        assert_eq!(selection.destinations(), &[at("e4"), at("e3")]);

        // Re-select another own piece.
        assert_eq!(
            selection.click(at("g1"), &oracle, PieceColor::White),
            SelectionStep::Selected
        );
        assert_eq!(selection.selected(), Some(at("g1")));

        // Same square clears.
        assert_eq!(
            selection.click(at("g1"), &oracle, PieceColor::White),
            SelectionStep::Deselected
        );
        assert_eq!(selection.selected(), None);

        // Non-destination, non-own square clears.
        selection.click(at("e2"), &oracle, PieceColor::White);
        assert_eq!(
            selection.click(at("d5"), &oracle, PieceColor::White),
            SelectionStep::Deselected
        );

        // Destination becomes a target and clears the selection.
        selection.click(at("e2"), &oracle, PieceColor::White);
        assert_eq!(
            selection.click(at("e4"), &oracle, PieceColor::White),
            SelectionStep::Target {
                from: at("e2"),
                to: at("e4")
            }
        );
        assert_eq!(selection.selected(), None);
    }
}
