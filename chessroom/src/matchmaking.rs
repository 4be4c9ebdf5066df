//! Waiting for an opponent.
//!
//! Asks the server for a match, then polls the status endpoint until a game
//! id comes back or the deadline passes.

use std::time::{Duration, Instant};

use chess_client::{ClientError, GameApi};

/// Error type for matchmaking waits.
#[derive(Debug, thiserror::Error)]
pub enum MatchWaitError {
    #[error("no opponent found after {0:?}")]
    Timeout(Duration),

    #[error("matchmaking request failed: {0}")]
    Request(#[from] ClientError),
}

/// Enter matchmaking and wait for a game.
///
/// The first request may already pair us. Otherwise the status endpoint is
/// polled every `poll_interval` until it reports a game.
///
/// # Errors
///
/// Returns [`MatchWaitError::Timeout`] if no game id arrives before `timeout`
/// elapses, or [`MatchWaitError::Request`] if the server call itself fails.
pub async fn wait_for_match(
    api: &dyn GameApi,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<String, MatchWaitError> {
    let deadline = Instant::now() + timeout;

    let initial = api.find_match().await?;
    if let Some(game_id) = initial.found_game() {
        return Ok(game_id.to_string());
    }
    tracing::info!("Searching for an opponent");

    loop {
        if Instant::now() >= deadline {
            return Err(MatchWaitError::Timeout(timeout));
        }

        tokio::time::sleep(poll_interval).await;

        let status = api.match_status().await?;
        if let Some(game_id) = status.found_game() {
            tracing::info!("Matched into game {}", game_id);
            return Ok(game_id.to_string());
        }
        tracing::debug!("Still searching (status: {})", status.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_client::mock::{MockCall, MockGameApi};
    use chess_client::protocol::MatchStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn searching() -> MatchStatus {
        MatchStatus {
            status: "searching".to_string(),
            game_id: None,
            message: None,
        }
    }

    fn found(game_id: &str) -> MatchStatus {
        MatchStatus {
            status: "found".to_string(),
            game_id: Some(game_id.to_string()),
            message: None,
        }
    }

    #[tokio::test]
    async fn test_immediate_match_skips_polling() {
        let api = MockGameApi::new().with_matchmaking_responses(|| Ok(found("g1")), || Ok(searching()));

        let game_id = wait_for_match(&api, Duration::from_secs(1), Duration::from_millis(1))
            .await
            .unwrap();

        assert_eq!(game_id, "g1");
        assert_eq!(api.get_calls(), vec![MockCall::FindMatch]);
    }

    #[tokio::test]
    async fn test_polls_until_found() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let api = MockGameApi::new().with_matchmaking_responses(
            || Ok(searching()),
            move || {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Ok(searching())
                } else {
                    Ok(found("g7"))
                }
            },
        );

        let game_id = wait_for_match(&api, Duration::from_secs(5), Duration::from_millis(1))
            .await
            .unwrap();

        assert_eq!(game_id, "g7");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out_while_searching() {
        let api = MockGameApi::new().with_matchmaking_responses(|| Ok(searching()), || Ok(searching()));

        let result = wait_for_match(&api, Duration::ZERO, Duration::from_millis(1)).await;

        assert!(matches!(result, Err(MatchWaitError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let api = MockGameApi::new();

        let result = wait_for_match(&api, Duration::from_secs(1), Duration::from_millis(1)).await;

        assert!(matches!(
            result,
            Err(MatchWaitError::Request(ClientError::NotConfigured(_)))
        ));
    }
}
