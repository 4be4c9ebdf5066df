//! Chess game server client library
//!
//! Talks to the game server over its REST API and its per-game WebSocket
//! channel. The session controller only sees the [`GameApi`] and
//! [`ChannelConnector`] traits, so tests swap in the mocks.
//!
//! # Example
//!
//! ```no_run
//! use chess_client::{GameApi, HttpGameClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpGameClient::new("http://localhost:8081/api")?;
//!     let game = client.create_game().await?;
//!     println!("Created game: {}", game.game_id);
//!     Ok(())
//! }
//! ```

mod channel;
mod client;
mod error;
pub mod protocol;
mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use channel::WsChannelConnector;
pub use client::HttpGameClient;
pub use error::{ClientError, ClientResult};
pub use protocol::{ChannelEvent, ChatMessage, GameState, GameStateUpdate, MoveAccepted};
pub use traits::{ChannelConnector, ChannelHandle, GameApi};
