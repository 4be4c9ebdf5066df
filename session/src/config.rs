//! Configuration for a chessroom session.
//!
//! Centralises the runtime tunables: server endpoints, queue capacities and
//! the chat log bound. Every value has a compile-time default and the
//! endpoints and chat bound can be overridden via environment variables.

/// Default REST API prefix.
const DEFAULT_API_URL: &str = "http://localhost:8081/api";

/// Default realtime socket endpoint.
const DEFAULT_WS_URL: &str = "ws://localhost:8081/ws";

/// Default number of chat lines kept in memory.
const DEFAULT_CHAT_LOG_CAPACITY: usize = 200;

/// Default capacity of the handle-to-actor command queue.
const DEFAULT_COMMAND_BUFFER: usize = 32;

/// Default capacity of the session event broadcast.
const DEFAULT_EVENT_BUFFER: usize = 100;

/// Get the REST API prefix.
///
/// Priority:
/// 1. `CHESSROOM_API_URL` env variable if set
/// 2. `http://localhost:8081/api` as fallback
pub fn get_api_url() -> String {
    if let Ok(url) = std::env::var("CHESSROOM_API_URL") {
        return url;
    }

    DEFAULT_API_URL.to_string()
}

/// Get the realtime socket endpoint.
///
/// Priority:
/// 1. `CHESSROOM_WS_URL` env variable if set
/// 2. `ws://localhost:8081/ws` as fallback
pub fn get_ws_url() -> String {
    if let Ok(url) = std::env::var("CHESSROOM_WS_URL") {
        return url;
    }

    DEFAULT_WS_URL.to_string()
}

/// Get the chat log capacity.
///
/// Priority:
/// 1. `CHESSROOM_CHAT_LOG_CAPACITY` env variable if set (falls back to the
///    default if the value is not a positive integer)
/// 2. `200` lines as fallback
pub fn get_chat_log_capacity() -> usize {
    if let Ok(capacity) = std::env::var("CHESSROOM_CHAT_LOG_CAPACITY") {
        return match capacity.parse() {
            Ok(n) if n > 0 => n,
            _ => DEFAULT_CHAT_LOG_CAPACITY,
        };
    }

    DEFAULT_CHAT_LOG_CAPACITY
}

/// Tunables for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api_url: String,
    pub ws_url: String,
    pub chat_log_capacity: usize,
    pub command_buffer: usize,
    pub event_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            chat_log_capacity: DEFAULT_CHAT_LOG_CAPACITY,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl SessionConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self {
            api_url: get_api_url(),
            ws_url: get_ws_url(),
            chat_log_capacity: get_chat_log_capacity(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_api_url() {
        let url = get_api_url();
        match std::env::var("CHESSROOM_API_URL") {
            Ok(val) => assert_eq!(url, val),
            Err(_) => assert_eq!(url, DEFAULT_API_URL),
        }
    }

    #[test]
    fn test_get_ws_url() {
        let url = get_ws_url();
        match std::env::var("CHESSROOM_WS_URL") {
            Ok(val) => assert_eq!(url, val),
            Err(_) => assert_eq!(url, DEFAULT_WS_URL),
        }
    }

    #[test]
    fn test_get_chat_log_capacity_positive() {
        assert!(get_chat_log_capacity() > 0);
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.ws_url, DEFAULT_WS_URL);
        assert_eq!(config.chat_log_capacity, DEFAULT_CHAT_LOG_CAPACITY);
        assert!(config.command_buffer > 0 && config.event_buffer > 0);
    }
}
