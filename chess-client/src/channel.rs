//! WebSocket realtime channel.
//!
//! One socket per game, opened at `<ws_url>?gameId=<id>`. A pump task owns the
//! socket: it decodes incoming text frames onto the event queue and frames
//! outgoing chat. When the socket closes the event queue ends, which is how
//! the session learns the channel is down.

use crate::error::{ClientError, ClientResult};
use crate::protocol::{encode_chat, ChannelEvent};
use crate::traits::{ChannelConnector, ChannelHandle};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_websockets::{ClientBuilder, Message};
use tracing::Instrument;
use url::Url;

const EVENT_BUFFER: usize = 256;
const OUTGOING_BUFFER: usize = 32;

/// Connects to the game server's WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct WsChannelConnector {
    ws_base: Url,
    cookie: Option<http::HeaderValue>,
}

impl WsChannelConnector {
    /// `ws_url` is the socket endpoint without query, e.g. `ws://localhost:8081/ws`.
    pub fn new(ws_url: &str) -> ClientResult<Self> {
        let ws_base = Url::parse(ws_url).map_err(|e| ClientError::InvalidAddress(e.to_string()))?;
        match ws_base.scheme() {
            "ws" | "wss" => Ok(Self {
                ws_base,
                cookie: None,
            }),
            other => Err(ClientError::InvalidAddress(format!(
                "unsupported channel scheme: {}",
                other
            ))),
        }
    }

    /// Send `cookie` with the upgrade request, as the server only admits
    /// logged-in players.
    pub fn with_cookie(mut self, cookie: http::HeaderValue) -> Self {
        self.cookie = Some(cookie);
        self
    }

    /// Socket URL for one game.
    pub fn game_url(&self, game_id: &str) -> Url {
        let mut url = self.ws_base.clone();
        url.query_pairs_mut().clear().append_pair("gameId", game_id);
        url
    }
}

#[async_trait]
impl ChannelConnector for WsChannelConnector {
    async fn open(&self, game_id: &str) -> ClientResult<ChannelHandle> {
        let url = self.game_url(game_id);
        let uri: http::Uri = url
            .as_str()
            .parse()
            .map_err(|e: http::uri::InvalidUri| ClientError::InvalidAddress(e.to_string()))?;

        let mut builder = ClientBuilder::from_uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.add_header(http::header::COOKIE, cookie.clone());
        }
        let (socket, _response) = builder.connect().await?;
        tracing::info!(%url, "Realtime channel connected");

        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (outgoing_tx, outgoing_rx) = mpsc::channel(OUTGOING_BUFFER);

        tokio::spawn(
            pump(socket, game_id.to_string(), event_tx, outgoing_rx)
                .instrument(tracing::info_span!("channel", game_id = %game_id)),
        );

        Ok(ChannelHandle {
            events: event_rx,
            outgoing: outgoing_tx,
        })
    }
}

async fn pump<S>(
    socket: S,
    game_id: String,
    event_tx: mpsc::Sender<ChannelEvent>,
    mut outgoing_rx: mpsc::Receiver<String>,
) where
    S: futures::Stream<Item = Result<Message, tokio_websockets::Error>>
        + futures::Sink<Message, Error = tokio_websockets::Error>,
{
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(msg)) => {
                        if msg.is_close() {
                            tracing::info!("Server closed realtime channel");
                            break;
                        }
                        let Some(text) = msg.as_text() else {
                            continue;
                        };
                        match ChannelEvent::decode(text) {
                            Ok(event) => {
                                if event_tx.send(event).await.is_err() {
                                    tracing::debug!("Session dropped channel receiver");
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("Dropping undecodable frame: {}", e),
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Realtime channel error: {}", e);
                        break;
                    }
                    None => {
                        tracing::info!("Realtime channel ended");
                        break;
                    }
                }
            }

            text = outgoing_rx.recv() => {
                let Some(text) = text else {
                    // Session side hung up; close politely.
                    let _ = sink.close().await;
                    break;
                };
                let frame = match encode_chat(&game_id, &text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!("Failed to encode chat: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::text(frame)).await {
                    tracing::warn!("Failed to send chat: {}", e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_url_has_game_id_query() {
        let connector = WsChannelConnector::new("ws://localhost:8081/ws").unwrap();
        assert_eq!(
            connector.game_url("abc 1").as_str(),
            "ws://localhost:8081/ws?gameId=abc+1"
        );
    }

    #[test]
    fn test_with_cookie_is_kept_for_upgrade() {
        let connector = WsChannelConnector::new("ws://localhost:8081/ws").unwrap();
        assert!(connector.cookie.is_none());

        let connector =
            connector.with_cookie(http::HeaderValue::from_static("session_token=abc123"));
        assert_eq!(
            connector.cookie.as_ref().map(|c| c.to_str().unwrap()),
            Some("session_token=abc123")
        );
    }

    #[test]
    fn test_rejects_http_scheme() {
        assert!(matches!(
            WsChannelConnector::new("http://localhost:8081/ws"),
            Err(ClientError::InvalidAddress(_))
        ));
    }
}
