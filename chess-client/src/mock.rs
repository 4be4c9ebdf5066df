//! Mock API and channel implementations for testing

use crate::error::{ClientError, ClientResult};
use crate::protocol::{
    ChannelEvent, GameState, JoinedGame, MatchStatus, MoveAccepted, NewGame,
};
use crate::traits::{ChannelConnector, ChannelHandle, GameApi};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Semaphore};

type Responder<T> = Box<dyn Fn(&str) -> ClientResult<T> + Send>;

/// Mock game API - only compiled in test mode or with mock feature
#[cfg(any(test, feature = "mock"))]
#[derive(Clone)]
pub struct MockGameApi {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    move_gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

#[cfg(any(test, feature = "mock"))]
#[derive(Default)]
struct MockResponses {
    login: Option<Responder<()>>,
    create_game: Option<Responder<NewGame>>,
    get_game: Option<Responder<GameState>>,
    submit_move: Option<Responder<MoveAccepted>>,
    join_game: Option<Responder<JoinedGame>>,
    find_match: Option<Responder<MatchStatus>>,
    match_status: Option<Responder<MatchStatus>>,
}

#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Login { username: String },
    CreateGame,
    GetGame { game_id: String },
    SubmitMove { game_id: String, mv: String },
    JoinGame { game_id: String },
    FindMatch,
    MatchStatus,
}

/// Holds `submit_move` responses until released, so tests can interleave
/// broadcasts with an in-flight request.
#[cfg(any(test, feature = "mock"))]
#[derive(Clone)]
pub struct MoveGate {
    permits: Arc<Semaphore>,
}

#[cfg(any(test, feature = "mock"))]
impl MoveGate {
    /// Let one held `submit_move` call respond.
    pub fn release_one(&self) {
        self.permits.add_permits(1);
    }
}

#[cfg(any(test, feature = "mock"))]
impl Default for MockGameApi {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockGameApi {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
            move_gate: Arc::new(Mutex::new(None)),
        }
    }

    /// Configure login response; the responder receives the username
    pub fn with_login_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> ClientResult<()> + Send + 'static,
    {
        self.responses.lock().unwrap().login = Some(Box::new(f));
        self
    }

    /// Configure create_game response
    pub fn with_create_game_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<NewGame> + Send + 'static,
    {
        self.responses.lock().unwrap().create_game = Some(Box::new(move |_| f()));
        self
    }

    /// Configure get_game response; the closure receives the game id
    pub fn with_get_game_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> ClientResult<GameState> + Send + 'static,
    {
        self.responses.lock().unwrap().get_game = Some(Box::new(f));
        self
    }

    /// Configure submit_move response; the closure receives the wire move
    pub fn with_submit_move_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> ClientResult<MoveAccepted> + Send + 'static,
    {
        self.responses.lock().unwrap().submit_move = Some(Box::new(f));
        self
    }

    /// Configure join_game response
    pub fn with_join_game_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> ClientResult<JoinedGame> + Send + 'static,
    {
        self.responses.lock().unwrap().join_game = Some(Box::new(f));
        self
    }

    /// Configure matchmaking responses
    pub fn with_matchmaking_responses<F, G>(self, find: F, status: G) -> Self
    where
        F: Fn() -> ClientResult<MatchStatus> + Send + 'static,
        G: Fn() -> ClientResult<MatchStatus> + Send + 'static,
    {
        {
            let mut responses = self.responses.lock().unwrap();
            responses.find_match = Some(Box::new(move |_| find()));
            responses.match_status = Some(Box::new(move |_| status()));
        }
        self
    }

    /// Pre-configure a game that always reports `fen` for the given color.
    pub fn with_game(self, game_id: &str, fen: &str, color: &str) -> Self {
        let state = GameState {
            fen: fen.to_string(),
            player_color: color.to_string(),
            move_history: None,
            state: Some("in_progress".to_string()),
        };
        let created = NewGame {
            game_id: game_id.to_string(),
            fen: fen.to_string(),
        };
        self.with_get_game_response(move |_| Ok(state.clone()))
            .with_create_game_response(move || Ok(created.clone()))
    }

    /// Hold every subsequent `submit_move` until the returned gate releases it.
    pub fn hold_moves(&self) -> MoveGate {
        let permits = Arc::new(Semaphore::new(0));
        *self.move_gate.lock().unwrap() = Some(permits.clone());
        MoveGate { permits }
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Recorded `submit_move` payloads, in order
    pub fn submitted_moves(&self) -> Vec<String> {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                MockCall::SubmitMove { mv, .. } => Some(mv.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    fn record(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn respond<T>(
        &self,
        pick: impl FnOnce(&MockResponses) -> Option<&Responder<T>>,
        arg: &str,
        name: &str,
    ) -> ClientResult<T> {
        let responses = self.responses.lock().unwrap();
        match pick(&*responses) {
            Some(f) => f(arg),
            None => Err(ClientError::NotConfigured(name.to_string())),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl GameApi for MockGameApi {
    async fn login(&self, username: &str, _password: &str) -> ClientResult<()> {
        self.record(MockCall::Login {
            username: username.to_string(),
        });
        self.respond(|r| r.login.as_ref(), username, "login")
    }

    async fn create_game(&self) -> ClientResult<NewGame> {
        self.record(MockCall::CreateGame);
        self.respond(|r| r.create_game.as_ref(), "", "create_game")
    }

    async fn get_game(&self, game_id: &str) -> ClientResult<GameState> {
        self.record(MockCall::GetGame {
            game_id: game_id.to_string(),
        });
        self.respond(|r| r.get_game.as_ref(), game_id, "get_game")
    }

    async fn submit_move(&self, game_id: &str, mv: &str) -> ClientResult<MoveAccepted> {
        self.record(MockCall::SubmitMove {
            game_id: game_id.to_string(),
            mv: mv.to_string(),
        });

        let gate = self.move_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.respond(|r| r.submit_move.as_ref(), mv, "submit_move")
    }

    async fn join_game(&self, game_id: &str) -> ClientResult<JoinedGame> {
        self.record(MockCall::JoinGame {
            game_id: game_id.to_string(),
        });
        self.respond(|r| r.join_game.as_ref(), game_id, "join_game")
    }

    async fn find_match(&self) -> ClientResult<MatchStatus> {
        self.record(MockCall::FindMatch);
        self.respond(|r| r.find_match.as_ref(), "", "find_match")
    }

    async fn match_status(&self) -> ClientResult<MatchStatus> {
        self.record(MockCall::MatchStatus);
        self.respond(|r| r.match_status.as_ref(), "", "match_status")
    }
}

/// Mock channel connector handing out one pre-built channel.
#[cfg(any(test, feature = "mock"))]
pub struct MockChannelConnector {
    handle: Mutex<Option<ChannelHandle>>,
    opened: Mutex<Vec<String>>,
}

/// Test-side end of a mock channel.
#[cfg(any(test, feature = "mock"))]
pub struct MockChannelRemote {
    events: Option<mpsc::Sender<ChannelEvent>>,
    outgoing: mpsc::Receiver<String>,
}

#[cfg(any(test, feature = "mock"))]
impl MockChannelConnector {
    /// A connector whose first `open` succeeds, plus the remote end.
    pub fn pair() -> (Self, MockChannelRemote) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (outgoing_tx, outgoing_rx) = mpsc::channel(64);
        let connector = Self {
            handle: Mutex::new(Some(ChannelHandle {
                events: event_rx,
                outgoing: outgoing_tx,
            })),
            opened: Mutex::new(Vec::new()),
        };
        let remote = MockChannelRemote {
            events: Some(event_tx),
            outgoing: outgoing_rx,
        };
        (connector, remote)
    }

    /// A connector whose `open` always fails.
    pub fn unreachable() -> Self {
        Self {
            handle: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Game ids passed to `open`
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl ChannelConnector for MockChannelConnector {
    async fn open(&self, game_id: &str) -> ClientResult<ChannelHandle> {
        self.opened.lock().unwrap().push(game_id.to_string());
        self.handle
            .lock()
            .unwrap()
            .take()
            .ok_or(ClientError::ChannelClosed)
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockChannelRemote {
    /// Deliver an event to the session.
    pub async fn push(&self, event: ChannelEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }

    /// Drop the connection from the server side.
    pub fn close(&mut self) {
        self.events = None;
    }

    /// Next chat text the session sent, if any arrives.
    pub async fn next_outgoing(&mut self) -> Option<String> {
        self.outgoing.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_call_errors_and_is_logged() {
        let api = MockGameApi::new();
        let result = api.submit_move("g1", "e2e4").await;
        assert!(matches!(result, Err(ClientError::NotConfigured(_))));
        assert_eq!(
            api.get_calls(),
            vec![MockCall::SubmitMove {
                game_id: "g1".to_string(),
                mv: "e2e4".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_login_response_and_log() {
        let api = MockGameApi::new().with_login_response(|username| {
            if username == "alice" {
                Ok(())
            } else {
                Err(ClientError::Status {
                    status: 401,
                    body: "Invalid username or password".to_string(),
                })
            }
        });

        api.login("alice", "secret").await.unwrap();
        let err = api.login("mallory", "guess").await.unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(
            api.get_calls(),
            vec![
                MockCall::Login {
                    username: "alice".to_string()
                },
                MockCall::Login {
                    username: "mallory".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_with_game_answers_get_and_create() {
        let api = MockGameApi::new().with_game("g1", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", "white");
        let state = api.get_game("g1").await.unwrap();
        assert_eq!(state.player_color, "white");
        let created = api.create_game().await.unwrap();
        assert_eq!(created.game_id, "g1");
    }

    #[test]
    fn test_move_gate_holds_response() {
        let api = MockGameApi::new().with_submit_move_response(|mv| {
            Ok(MoveAccepted {
                new_fen: format!("after {}", mv),
                ..Default::default()
            })
        });
        let gate = api.hold_moves();

        let mut call = tokio_test::task::spawn(api.submit_move("g1", "e2e4"));
        tokio_test::assert_pending!(call.poll());

        gate.release_one();
        assert!(call.is_woken());
        let accepted = tokio_test::assert_ready_ok!(call.poll());
        assert_eq!(accepted.new_fen, "after e2e4");
    }

    #[tokio::test]
    async fn test_mock_channel_pair() {
        let (connector, mut remote) = MockChannelConnector::pair();
        let mut handle = connector.open("g1").await.unwrap();
        assert!(connector.open("g1").await.is_err());
        assert_eq!(connector.opened(), vec!["g1".to_string(), "g1".to_string()]);

        handle.outgoing.send("hello".to_string()).await.unwrap();
        assert_eq!(remote.next_outgoing().await.as_deref(), Some("hello"));

        remote.close();
        assert!(handle.events.recv().await.is_none());
    }
}
