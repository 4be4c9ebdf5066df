//! Session controller for a two-player networked chess game.
//!
//! A session owns the interaction state for one game: what is selected,
//! which move is in flight, whether a promotion is waiting for a choice. It
//! validates moves locally against a [`chess::MoveOracle`], confirms them with
//! the server over [`chess_client::GameApi`], and reconciles pushed state from
//! the realtime channel. The server's position always wins.
//!
//! All state lives in one actor task; callers talk to it through a
//! [`SessionHandle`] and observe it through [`SessionEvent`]s.

mod actor;
mod bootstrap;
pub mod board_cache;
mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
mod handle;
pub mod outcome;
pub mod promotion;
pub mod realtime;
pub mod selection;
pub mod snapshot;
mod state;
pub mod sync;

pub use bootstrap::start_session;
pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use outcome::GameOutcome;
pub use realtime::{ChatLine, OWN_SENDER};
pub use selection::{ClickOutcome, IgnoreReason};
pub use snapshot::SessionSnapshot;
