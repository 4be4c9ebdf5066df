use chess::{Coord, MoveNotation, PromotionKind};
use tokio::sync::{broadcast, oneshot};

use crate::error::SessionResult;
use crate::events::SessionEvent;
use crate::selection::ClickOutcome;
use crate::snapshot::SessionSnapshot;

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
pub enum SessionCommand {
    Click {
        at: Coord,
        reply: oneshot::Sender<ClickOutcome>,
    },
    ChoosePromotion {
        kind: PromotionKind,
        reply: oneshot::Sender<SessionResult<MoveNotation>>,
    },
    SendChat {
        text: String,
        reply: oneshot::Sender<SessionResult<()>>,
    },
    /// Refetch the authoritative game state.
    Reload {
        reply: oneshot::Sender<SessionResult<()>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
