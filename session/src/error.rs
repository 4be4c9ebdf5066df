use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The oracle refused a move; nothing was sent.
    #[error("Move rejected locally: {0}")]
    LocalValidationRejection(String),

    #[error("No promotion is waiting for a choice")]
    NoPromotionPending,

    /// Transport failure or server fault; the last authoritative position was restored.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The server refused a locally accepted move; a reload follows.
    #[error("Out of sync with the server: {0}. Reloading the game.")]
    ProtocolDesync(String),

    #[error("Realtime channel unavailable: {0}")]
    ChannelFailure(String),

    /// The session could not be started.
    #[error("Failed to start session: {0}")]
    Bootstrap(String),

    #[error("Session closed")]
    Closed,
}
