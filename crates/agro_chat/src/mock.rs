//! Scripted generation provider.
//!
//! Returns queued replies or failures in order and records every prompt it
//! receives, so exchanges can be driven deterministically without a network.
//! A held provider keeps each call pending until [`ScriptedProvider::release`]
//! is called, which lets tests observe the orchestrator mid-exchange.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::GenerationProvider;

/// What to do when the script runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exhausted {
    Fail,
    Echo,
}

/// Deterministic provider for tests and offline sessions.
#[derive(Clone)]
pub struct ScriptedProvider {
    /// Replies returned in order.
    script: Arc<RwLock<VecDeque<ProviderResult<String>>>>,
    /// Prompts received, in call order.
    prompts: Arc<RwLock<Vec<String>>>,
    /// Gate that held calls wait on.
    gate: Option<Arc<Notify>>,
    exhausted: Exhausted,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    /// Create an empty script; calls beyond it fail.
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            prompts: Arc::new(RwLock::new(Vec::new())),
            gate: None,
            exhausted: Exhausted::Fail,
        }
    }

    /// Provider that answers every prompt with an acknowledgement quoting it.
    pub fn echo() -> Self {
        Self {
            exhausted: Exhausted::Echo,
            ..Self::new()
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.script.write().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: ProviderError) -> Self {
        self.script.write().push_back(Err(error));
        self
    }

    /// Hold every call until [`release`](Self::release) is called once per call.
    pub fn held(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Let one held call proceed. Has no effect on an unheld provider.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.read().len()
    }

    /// Number of scripted replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.read().len()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        self.prompts.write().push(prompt.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.script.write().pop_front();
        match (next, self.exhausted) {
            (Some(result), _) => result,
            (None, Exhausted::Echo) => Ok(format!(
                "*Offline mode* - no assistant is connected.\n* You asked: {}",
                prompt
            )),
            (None, Exhausted::Fail) => Err(ProviderError::MalformedReply(
                "script exhausted".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_and_records_prompts() {
        let provider = ScriptedProvider::new()
            .reply("first")
            .fail(ProviderError::Blocked("SAFETY".to_string()))
            .reply("third");

        assert_eq!(provider.generate("a").await.unwrap(), "first");
        assert!(provider.generate("b").await.is_err());
        assert_eq!(provider.generate("c").await.unwrap(), "third");
        assert!(matches!(
            provider.generate("d").await,
            Err(ProviderError::MalformedReply(_))
        ));

        assert_eq!(provider.prompts(), vec!["a", "b", "c", "d"]);
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test]
    async fn test_echo_quotes_prompt() {
        let provider = ScriptedProvider::echo();
        let reply = provider.generate("when to sow rice?").await.unwrap();

        assert!(reply.contains("when to sow rice?"));
    }

    #[tokio::test]
    async fn test_release_before_call_is_remembered() {
        let provider = ScriptedProvider::new().held().reply("ok");
        provider.release();

        assert_eq!(provider.generate("x").await.unwrap(), "ok");
    }
}
