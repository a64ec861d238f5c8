//! Chat Session Store
//!
//! Holds the ordered message list and the send state machine. Insertion
//! order is chronological and preserved; no reordering ever happens.
//!
//! # Design Philosophy
//!
//! This is a pure data structure: the async orchestration (network calls,
//! cache invalidation) lives in [`crate::oracle::Oracle`]. Sends are an
//! explicit state machine `Idle -> Sending -> Idle`; a second send while
//! one is in flight is rejected with a typed error instead of silently
//! racing. On send failure nothing is discarded — the whole list is marked
//! stale and resynchronized from server truth on the next load.

use thiserror::Error;

use crate::api::client::ApiError;
use crate::messages::{ChatMessage, MessageId, OutgoingMessage};

/// Errors surfaced by chat operations
#[derive(Debug, Error)]
pub enum ChatError {
    /// A send was attempted while another is still in flight
    #[error("a message send is already in flight")]
    SendInFlight,
    /// The backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Send state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SendState {
    /// Ready to send
    #[default]
    Idle,
    /// A send is in flight; the UI disables the send control
    Sending,
}

/// Ordered chat message list with optimistic insert semantics
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    send_state: SendState,
    stale: bool,
}

impl ChatSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in chronological insertion order
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent message
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Whether a send is in flight
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.send_state == SendState::Sending
    }

    /// Whether the list must be refetched before being trusted
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Begin a send: optimistic insert of the local user message
    ///
    /// The synthesized message renders before any network round trip
    /// completes. At most one optimistic message is pending per in-flight
    /// send, enforced by the state machine.
    ///
    /// # Errors
    ///
    /// [`ChatError::SendInFlight`] when a send is already in flight.
    pub fn begin_send(&mut self, outgoing: &OutgoingMessage) -> Result<MessageId, ChatError> {
        if self.is_sending() {
            return Err(ChatError::SendInFlight);
        }
        let message = ChatMessage::local_user(outgoing.content.clone(), outgoing);
        let id = message.id.clone();
        self.messages.push(message);
        self.send_state = SendState::Sending;
        tracing::debug!(id = %id, "optimistic user message inserted");
        Ok(id)
    }

    /// Complete a send with the server's assistant reply
    ///
    /// The reply is appended; the optimistic user message is kept (its
    /// temporary id is never reconciled with a server id) and merely
    /// marked non-pending.
    pub fn complete_send(&mut self, optimistic_id: &MessageId, reply: ChatMessage) {
        if let Some(message) = self.messages.iter_mut().find(|m| &m.id == optimistic_id) {
            message.pending = false;
        }
        self.messages.push(reply);
        self.send_state = SendState::Idle;
    }

    /// Record a failed send
    ///
    /// Nothing is rolled back; the list is marked stale so the next load
    /// resynchronizes with server truth (the correction mechanism for the
    /// orphaned optimistic insert).
    pub fn fail_send(&mut self) {
        self.send_state = SendState::Idle;
        self.stale = true;
        tracing::debug!("send failed; message list marked stale");
    }

    /// Replace the whole list with server history
    pub fn replace_history(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.stale = false;
    }

    /// Replace a single message in place (confirm-tracking echo)
    ///
    /// Returns false when no message with the id exists.
    pub fn replace_message(&mut self, updated: ChatMessage) -> bool {
        match self.messages.iter_mut().find(|m| m.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Empty the message list
    ///
    /// Callers must also invalidate the logs and summary caches: a reset
    /// clears server-side logs too.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.stale = false;
    }
}
