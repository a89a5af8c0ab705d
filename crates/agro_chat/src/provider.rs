//! Generation provider abstraction.
//!
//! The orchestrator only knows this trait. Credentials, model choice and
//! transport belong to the implementation, which is constructed by the
//! caller and injected.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Turns a prompt into a reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a reply for `prompt`.
    async fn generate(&self, prompt: &str) -> ProviderResult<String>;
}

#[async_trait]
impl<P: GenerationProvider + ?Sized> GenerationProvider for Arc<P> {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        (**self).generate(prompt).await
    }
}

/// Bounded-wait wrapper around another provider.
///
/// The orchestrator enforces no deadline of its own; wrap the provider in
/// this to turn a stalled call into [`ProviderError::Timeout`].
pub struct TimeoutProvider<P> {
    inner: P,
    limit: Duration,
}

impl<P: GenerationProvider> TimeoutProvider<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[async_trait]
impl<P: GenerationProvider> GenerationProvider for TimeoutProvider<P> {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        match tokio::time::timeout(self.limit, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                debug!("Provider call exceeded {:?}", self.limit);
                Err(ProviderError::Timeout(self.limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedProvider;

    #[tokio::test]
    async fn test_timeout_passes_through_fast_reply() {
        let provider = TimeoutProvider::new(
            ScriptedProvider::new().reply("Rotate crops yearly"),
            Duration::from_secs(5),
        );

        let reply = provider.generate("crop rotation?").await.unwrap();
        assert_eq!(reply, "Rotate crops yearly");
    }

    #[tokio::test]
    async fn test_timeout_expires_on_stalled_call() {
        let stalled = ScriptedProvider::new().held().reply("too late");
        let provider = TimeoutProvider::new(stalled, Duration::from_millis(20));

        let err = provider.generate("anyone there?").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(limit) if limit == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_timeout_passes_through_failures() {
        let mut inner = MockGenerationProvider::new();
        inner
            .expect_generate()
            .times(1)
            .returning(|_| Err(ProviderError::Transport("connection reset".to_string())));

        let provider = TimeoutProvider::new(inner, Duration::from_secs(1));
        let err = provider.generate("hello").await.unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[tokio::test]
    async fn test_shared_provider_delegates() {
        let shared = Arc::new(ScriptedProvider::new().reply("shared"));
        assert_eq!(shared.generate("x").await.unwrap(), "shared");
    }
}
