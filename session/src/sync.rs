//! Two-phase move synchronization: local acceptance, then server confirmation.

use chess::{Coord, MoveNotation};
use chess_client::{ClientError, ClientResult, MoveAccepted};

use crate::context::InFlightGuard;

/// A locally accepted move that the server has not yet answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    pub origin: Coord,
    pub destination: Coord,
    pub promotion_awaited: bool,
}

impl PendingMove {
    pub fn notation(&self) -> MoveNotation {
        MoveNotation::new(self.origin, self.destination)
    }
}

/// The controller's record of the move holding the processing lock.
///
/// Dropping it releases the lock, so every resolution path ends by dropping
/// the record.
#[derive(Debug)]
pub(crate) struct InFlightMove {
    pub pending: PendingMove,
    /// Full wire notation once known (includes the promotion suffix).
    pub notation: MoveNotation,
    /// Set when a broadcast already recorded this move in the history.
    pub recorded: bool,
    _guard: InFlightGuard,
}

impl InFlightMove {
    pub fn new(pending: PendingMove, guard: InFlightGuard) -> Self {
        Self {
            notation: pending.notation(),
            pending,
            recorded: false,
            _guard: guard,
        }
    }

    /// Whether a broadcast's `lastMove` refers to this move.
    pub fn is_move(&self, last_move: &str) -> bool {
        !self.pending.promotion_awaited
            && last_move.trim().eq_ignore_ascii_case(&self.notation.to_string())
    }
}

/// A move ready to be sent, produced once local validation (and any
/// promotion choice) is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub notation: MoveNotation,
}

/// How the server answered a submitted move.
#[derive(Debug)]
pub(crate) enum MoveResolution {
    Confirmed(MoveAccepted),
    /// The server refused a move the oracle accepted.
    Desync(String),
    NetworkFailure(String),
}

impl MoveResolution {
    pub fn classify(result: ClientResult<MoveAccepted>) -> Self {
        match result {
            Ok(accepted) if accepted.new_fen.trim().is_empty() => {
                MoveResolution::NetworkFailure("server response carried no position".to_string())
            }
            Ok(accepted) => MoveResolution::Confirmed(accepted),
            Err(err) if err.is_rejection() => MoveResolution::Desync(rejection_message(err)),
            Err(err) => MoveResolution::NetworkFailure(err.to_string()),
        }
    }
}

/// Text to show for a refused move: the server's message, or its status.
fn rejection_message(err: ClientError) -> String {
    match err {
        ClientError::Rejected { message, .. } => message,
        ClientError::Status { body, .. } if !body.trim().is_empty() => body.trim().to_string(),
        ClientError::Status { status, .. } => format!("status {}", status),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProcessingLock;

    fn pending(from: &str, to: &str) -> PendingMove {
        PendingMove {
            origin: from.parse().unwrap(),
            destination: to.parse().unwrap(),
            promotion_awaited: false,
        }
    }

    #[test]
    fn test_in_flight_record_holds_lock() {
        let lock = ProcessingLock::default();
        let record = InFlightMove::new(pending("e2", "e4"), lock.try_acquire().unwrap());
        assert!(lock.is_held());
        assert_eq!(record.notation.to_string(), "e2e4");
        drop(record);
        assert!(!lock.is_held());
    }

    #[test]
    fn test_matches_last_move() {
        let lock = ProcessingLock::default();
        let record = InFlightMove::new(pending("e2", "e4"), lock.try_acquire().unwrap());
        assert!(record.is_move("e2e4"));
        assert!(!record.is_move("e7e5"));
    }

    #[test]
    fn test_classify() {
        let ok = MoveResolution::classify(Ok(MoveAccepted {
            new_fen: "8/8/8/8/8/8/8/K6k b - - 0 1".to_string(),
            ..Default::default()
        }));
        assert!(matches!(ok, MoveResolution::Confirmed(_)));

        let empty = MoveResolution::classify(Ok(MoveAccepted::default()));
        assert!(matches!(empty, MoveResolution::NetworkFailure(_)));

        let rejected = MoveResolution::classify(Err(ClientError::Rejected {
            status: 400,
            message: "Illegal move".to_string(),
        }));
        assert!(matches!(rejected, MoveResolution::Desync(ref m) if m == "Illegal move"));

        let forbidden = MoveResolution::classify(Err(ClientError::Status {
            status: 403,
            body: "Not your turn\n".to_string(),
        }));
        assert!(matches!(forbidden, MoveResolution::Desync(ref m) if m == "Not your turn"));

        let conflict = MoveResolution::classify(Err(ClientError::Status {
            status: 409,
            body: "  ".to_string(),
        }));
        assert!(matches!(conflict, MoveResolution::Desync(ref m) if m == "status 409"));

        let server_fault = MoveResolution::classify(Err(ClientError::Status {
            status: 500,
            body: String::new(),
        }));
        assert!(matches!(server_fault, MoveResolution::NetworkFailure(_)));
    }
}
