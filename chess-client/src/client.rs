//! REST client for the game server.

use crate::error::{ClientError, ClientResult};
use crate::protocol::{
    ErrorBody, GameState, JoinedGame, MatchStatus, MoveAccepted, MoveRequest, NewGame,
};
use crate::traits::GameApi;
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Network client for the game server's REST API.
#[derive(Debug, Clone)]
pub struct HttpGameClient {
    http: reqwest::Client,
    base: Url,
    cookies: Arc<Jar>,
}

impl HttpGameClient {
    /// Build a client rooted at the API prefix, e.g. `http://localhost:8081/api`.
    pub fn new(api_base: &str) -> ClientResult<Self> {
        let base = Url::parse(api_base).map_err(|e| ClientError::InvalidAddress(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidAddress(api_base.to_string()));
        }

        // The session cookie set by `login` is replayed on every call.
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .build()?;

        Ok(Self {
            http,
            base,
            cookies,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `Cookie` header value for the API origin, once logged in. The
    /// realtime channel needs it to pass the server's auth check.
    pub fn session_cookie(&self) -> Option<HeaderValue> {
        self.cookies.cookies(&self.base)
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidAddress(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Succeed on any 2xx, discarding the body, or classify the failure.
async fn read_ok(response: Response) -> ClientResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(error_from_body(status, response.text().await.unwrap_or_default()))
}

/// Decode a JSON body on success, or classify the failure.
async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    Err(error_from_body(status, response.text().await.unwrap_or_default()))
}

fn error_from_body(status: StatusCode, body: String) -> ClientError {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => ClientError::Rejected {
            status: status.as_u16(),
            message: err.message,
        },
        Err(_) => ClientError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl GameApi for HttpGameClient {
    async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let url = self.endpoint(&["login"])?;
        tracing::debug!(%url, username, "Logging in");
        let form = [("username", username), ("password", password)];
        read_ok(self.http.post(url).form(&form).send().await?).await
    }

    async fn create_game(&self) -> ClientResult<NewGame> {
        let url = self.endpoint(&["game", "new"])?;
        tracing::debug!(%url, "Creating game");
        read_json(self.http.post(url).send().await?).await
    }

    async fn get_game(&self, game_id: &str) -> ClientResult<GameState> {
        let url = self.endpoint(&["game", game_id])?;
        read_json(self.http.get(url).send().await?).await
    }

    async fn submit_move(&self, game_id: &str, mv: &str) -> ClientResult<MoveAccepted> {
        let url = self.endpoint(&["game", game_id, "move"])?;
        let body = MoveRequest { mv: mv.to_string() };
        tracing::debug!(%url, mv, "Submitting move");
        read_json(self.http.post(url).json(&body).send().await?).await
    }

    async fn join_game(&self, game_id: &str) -> ClientResult<JoinedGame> {
        let url = self.endpoint(&["game", game_id, "join"])?;
        read_json(self.http.post(url).send().await?).await
    }

    async fn find_match(&self) -> ClientResult<MatchStatus> {
        let url = self.endpoint(&["matchmaking", "find"])?;
        // 202 Accepted means "searching"; 200 may already carry the game.
        read_json(self.http.post(url).send().await?).await
    }

    async fn match_status(&self) -> ClientResult<MatchStatus> {
        let url = self.endpoint(&["matchmaking", "status"])?;
        read_json(self.http.get(url).send().await?).await
    }
}
