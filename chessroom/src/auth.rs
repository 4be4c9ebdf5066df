//! Signing in before any game call.

use chess_client::{ClientError, GameApi};

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("no password for {0}: pass --password or set CHESSROOM_PASSWORD")]
    MissingPassword(String),

    #[error("login refused: {0}")]
    Refused(String),

    #[error("login failed: {0}")]
    Request(#[source] ClientError),
}

/// Log `username` in. `password` falls back to the environment.
pub async fn sign_in(
    api: &dyn GameApi,
    username: &str,
    password: Option<String>,
) -> Result<(), SignInError> {
    let password = password
        .or_else(crate::config::get_password)
        .ok_or_else(|| SignInError::MissingPassword(username.to_string()))?;

    match api.login(username, &password).await {
        Ok(()) => {
            tracing::info!(username, "Logged in");
            Ok(())
        }
        Err(ClientError::Status { body, .. }) if !body.trim().is_empty() => {
            Err(SignInError::Refused(body.trim().to_string()))
        }
        Err(ClientError::Rejected { message, .. }) => Err(SignInError::Refused(message)),
        Err(e) => Err(SignInError::Request(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_client::mock::{MockCall, MockGameApi};

    fn server() -> MockGameApi {
        MockGameApi::new().with_login_response(|username| {
            if username == "alice" {
                Ok(())
            } else {
                Err(ClientError::Status {
                    status: 401,
                    body: "Invalid username or password\n".to_string(),
                })
            }
        })
    }

    #[tokio::test]
    async fn test_sign_in_with_explicit_password() {
        let api = server();

        sign_in(&api, "alice", Some("secret".to_string())).await.unwrap();

        assert_eq!(
            api.get_calls(),
            vec![MockCall::Login {
                username: "alice".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_refusal_carries_server_text() {
        let api = server();

        let err = sign_in(&api, "bob", Some("wrong".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, SignInError::Refused(ref m) if m == "Invalid username or password"));
    }

    #[tokio::test]
    async fn test_missing_password_makes_no_call() {
        if std::env::var("CHESSROOM_PASSWORD").is_ok() {
            return;
        }
        let api = server();

        let err = sign_in(&api, "alice", None).await.unwrap_err();

        assert!(matches!(err, SignInError::MissingPassword(_)));
        assert!(api.get_calls().is_empty());
    }
}
