//! Core types for the assistant conversation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequential message identifier, unique within one conversation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Label shown next to the message in a transcript
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Agri Assistant",
        }
    }
}

/// A single turn in the conversation.
///
/// `text` is stored exactly as submitted or received, markup included.
/// Renderers parse it on read with [`crate::markup::parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Sequential ID assigned by the log
    pub id: MessageId,
    /// Raw message text
    pub text: String,
    /// Who wrote the message
    pub sender: Sender,
    /// When the message was appended
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        sender: Sender,
        text: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text,
            sender,
            created_at,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}

/// Whether an exchange is currently outstanding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExchangeState {
    /// No provider call outstanding; submissions are accepted
    Idle,
    /// A provider call is outstanding; submissions are rejected
    Awaiting,
}

impl Default for ExchangeState {
    fn default() -> Self {
        Self::Idle
    }
}
