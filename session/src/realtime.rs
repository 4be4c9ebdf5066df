//! State fed by the realtime channel: move history, chat, channel status.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::error::{SessionError, SessionResult};

/// Moves in play order, as wire notation.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    moves: Vec<String>,
}

impl MoveHistory {
    /// Replace the history with the server's copy.
    pub fn seed(&mut self, moves: impl IntoIterator<Item = String>) {
        self.moves = moves
            .into_iter()
            .map(|mv| mv.trim().to_string())
            .filter(|mv| !mv.is_empty())
            .collect();
    }

    pub fn push(&mut self, mv: &str) {
        let mv = mv.trim();
        if !mv.is_empty() {
            self.moves.push(mv.to_string());
        }
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn last(&self) -> Option<&str> {
        self.moves.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Sender shown on lines this session sent; the server does not echo them.
pub const OWN_SENDER: &str = "me";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub sender: Option<String>,
    pub text: String,
}

/// Chat lines, oldest evicted once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct ChatLog {
    lines: VecDeque<ChatLine>,
    capacity: usize,
}

impl ChatLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: ChatLine) {
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &ChatLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Outgoing half of the realtime channel. Chat is enabled only while open.
#[derive(Debug, Default)]
pub struct ChannelState {
    outgoing: Option<mpsc::Sender<String>>,
}

impl ChannelState {
    pub fn open(&mut self, outgoing: mpsc::Sender<String>) {
        self.outgoing = Some(outgoing);
    }

    pub fn close(&mut self) {
        self.outgoing = None;
    }

    pub fn is_open(&self) -> bool {
        self.outgoing.is_some()
    }

    /// Queue chat text for the socket.
    pub fn send_chat(&self, text: &str) -> SessionResult<()> {
        let outgoing = self
            .outgoing
            .as_ref()
            .ok_or_else(|| SessionError::ChannelFailure("channel is closed".to_string()))?;
        outgoing
            .try_send(text.to_string())
            .map_err(|e| SessionError::ChannelFailure(e.to_string()))
    }
}
