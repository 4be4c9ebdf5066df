//! Runtime tunables for the `chessroom` binary.
//!
//! Server addresses and chat limits live in [`chess_session::SessionConfig`];
//! this module covers what only the CLI needs: the matchmaking poll, the
//! login password and the log directory. Every value has a default and an environment override.

use std::path::PathBuf;

/// Default time to wait for an opponent (in seconds).
const DEFAULT_MATCH_TIMEOUT_SECS: u64 = 120;

/// Default delay between matchmaking polls (in milliseconds).
const DEFAULT_MATCH_POLL_INTERVAL_MS: u64 = 1000;

/// Default directory for rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// Get the matchmaking timeout in seconds.
///
/// Priority:
/// 1. `CHESSROOM_MATCH_TIMEOUT_SECS` env variable if set (falls back to default
///    if the value cannot be parsed as a `u64`)
/// 2. `120` seconds as fallback
pub fn get_match_timeout_secs() -> u64 {
    if let Ok(timeout) = std::env::var("CHESSROOM_MATCH_TIMEOUT_SECS") {
        return timeout.parse().unwrap_or(DEFAULT_MATCH_TIMEOUT_SECS);
    }

    DEFAULT_MATCH_TIMEOUT_SECS
}

/// Get the matchmaking poll interval in milliseconds.
///
/// Priority:
/// 1. `CHESSROOM_MATCH_POLL_INTERVAL_MS` env variable if set
/// 2. `1000` ms as fallback
pub fn get_match_poll_interval_ms() -> u64 {
    if let Ok(interval) = std::env::var("CHESSROOM_MATCH_POLL_INTERVAL_MS") {
        return interval.parse().unwrap_or(DEFAULT_MATCH_POLL_INTERVAL_MS);
    }

    DEFAULT_MATCH_POLL_INTERVAL_MS
}

/// Get the login password when none was given on the command line.
///
/// Read from `CHESSROOM_PASSWORD`; there is no default.
pub fn get_password() -> Option<String> {
    std::env::var("CHESSROOM_PASSWORD").ok()
}

/// Get the directory that receives the daily log files.
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHESSROOM_LOG_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}
