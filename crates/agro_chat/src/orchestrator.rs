//! Single-flight chat orchestrator.
//!
//! The orchestrator owns the conversation log and the exchange state. Each
//! accepted submission appends the user message, calls the provider, then
//! appends either the reply or a fixed fallback. While a call is outstanding
//! every further submission is rejected, so each exchange occupies two
//! adjacent log entries.
//!
//! ```text
//!            submit (accepted)
//!   ┌──────┐ ─────────────────▶ ┌──────────┐
//!   │ Idle │                    │ Awaiting │
//!   └──────┘ ◀───────────────── └──────────┘
//!            reply or fallback
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::error::{ProviderError, ProviderResult, SubmitRejection};
use crate::log::{ConversationLog, LogEvent};
use crate::provider::GenerationProvider;
use crate::types::{ExchangeState, Message, Sender};

/// Assistant text appended when the provider fails
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Result of one accepted exchange
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// The provider replied; `assistant` holds the reply verbatim
    Replied { user: Message, assistant: Message },
    /// The provider failed; `assistant` holds [`FALLBACK_REPLY`]
    Failed {
        user: Message,
        assistant: Message,
        error: ProviderError,
    },
}

impl ExchangeOutcome {
    pub fn user(&self) -> &Message {
        match self {
            Self::Replied { user, .. } | Self::Failed { user, .. } => user,
        }
    }

    pub fn assistant(&self) -> &Message {
        match self {
            Self::Replied { assistant, .. } | Self::Failed { assistant, .. } => assistant,
        }
    }

    /// The provider failure, if the exchange fell back
    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            Self::Replied { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

struct Conversation {
    log: ConversationLog,
    state: ExchangeState,
}

/// Drives one exchange at a time against an injected provider.
///
/// Methods take `&self`; share the orchestrator through an `Arc` when
/// submissions come from several tasks. The internal lock is never held
/// across the provider call.
pub struct ChatOrchestrator {
    conversation: Mutex<Conversation>,
    provider: Arc<dyn GenerationProvider>,
}

impl ChatOrchestrator {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            conversation: Mutex::new(Conversation {
                log: ConversationLog::new(),
                state: ExchangeState::Idle,
            }),
            provider,
        }
    }

    pub fn state(&self) -> ExchangeState {
        self.conversation.lock().state
    }

    pub fn is_awaiting(&self) -> bool {
        self.state() == ExchangeState::Awaiting
    }

    /// Copy of the log in append order
    pub fn snapshot(&self) -> Vec<Message> {
        self.conversation.lock().log.snapshot()
    }

    pub fn message_count(&self) -> usize {
        self.conversation.lock().log.len()
    }

    /// Receive a [`LogEvent`] for every later append
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.conversation.lock().log.subscribe()
    }

    /// Run one exchange.
    ///
    /// Rejections leave the log and state untouched. Once accepted, the
    /// exchange always ends with an assistant message and the state back at
    /// `Idle`, whether the provider replied or failed. The future must be
    /// driven to completion; if it is dropped mid-call the fallback is
    /// appended so the log keeps its user/assistant pairing.
    pub async fn submit(&self, raw_input: &str) -> Result<ExchangeOutcome, SubmitRejection> {
        let (prompt, user) = self.begin(raw_input)?;
        let mut guard = InFlight {
            orchestrator: self,
            finished: false,
        };

        let result = self.provider.generate(&prompt).await;

        guard.finished = true;
        Ok(self.finish(user, result))
    }

    fn begin(&self, raw_input: &str) -> Result<(String, Message), SubmitRejection> {
        let mut conversation = self.conversation.lock();

        if conversation.state == ExchangeState::Awaiting {
            trace!("Rejected submission: exchange already in flight");
            return Err(SubmitRejection::AlreadyInFlight);
        }

        let prompt = raw_input.trim();
        if prompt.is_empty() {
            trace!("Rejected submission: empty input");
            return Err(SubmitRejection::EmptyInput);
        }

        let user = conversation.log.append(Sender::User, prompt);
        conversation.state = ExchangeState::Awaiting;
        debug!(id = %user.id, "Exchange started");

        Ok((prompt.to_string(), user))
    }

    fn finish(&self, user: Message, result: ProviderResult<String>) -> ExchangeOutcome {
        let mut conversation = self.conversation.lock();

        let outcome = match result.and_then(usable_reply) {
            Ok(reply) => {
                let assistant = conversation.log.append(Sender::Assistant, reply);
                info!(id = %assistant.id, "Assistant replied");
                ExchangeOutcome::Replied { user, assistant }
            }
            Err(error) => {
                warn!(error = %error, "Provider failed, appending fallback reply");
                let assistant = conversation.log.append(Sender::Assistant, FALLBACK_REPLY);
                ExchangeOutcome::Failed {
                    user,
                    assistant,
                    error,
                }
            }
        };

        conversation.state = ExchangeState::Idle;
        outcome
    }

    fn abandon(&self) {
        let mut conversation = self.conversation.lock();
        if conversation.state == ExchangeState::Awaiting {
            warn!("Exchange dropped before the provider resolved, appending fallback reply");
            conversation.log.append(Sender::Assistant, FALLBACK_REPLY);
            conversation.state = ExchangeState::Idle;
        }
    }
}

/// Restores the pairing invariant if `submit` is dropped mid-call.
struct InFlight<'a> {
    orchestrator: &'a ChatOrchestrator,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.orchestrator.abandon();
        }
    }
}

/// A blank reply cannot be shown, so it counts as a failure.
fn usable_reply(reply: String) -> ProviderResult<String> {
    if reply.trim().is_empty() {
        Err(ProviderError::MalformedReply("empty reply".to_string()))
    } else {
        Ok(reply)
    }
}
