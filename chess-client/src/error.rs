//! Error types for the chess client

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response carrying a structured `{ message }` body.
    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Non-2xx response without a structured body.
    #[error("Server returned status {status}")]
    Status { status: u16, body: String },

    #[error("Realtime channel error: {0}")]
    Channel(#[from] tokio_websockets::Error),

    #[error("Realtime channel closed")]
    ChannelClosed,

    #[error("Failed to decode server data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server returned invalid data: {0}")]
    InvalidData(String),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}

impl ClientError {
    /// True when the server understood the request and refused it: any
    /// structured rejection, or a bare 4xx.
    pub fn is_rejection(&self) -> bool {
        match self {
            ClientError::Rejected { .. } => true,
            ClientError::Status { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}
