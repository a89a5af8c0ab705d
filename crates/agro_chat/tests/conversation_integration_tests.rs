//! Integration tests for the assistant pipeline.

use std::sync::Arc;
use std::time::Duration;

use agro_chat::{
    parse, ChatOrchestrator, ExchangeState, FormattedSegment, LogEvent, ProviderError,
    ScriptedProvider, Sender, SubmitRejection, TimeoutProvider, FALLBACK_REPLY,
};

/// Every accepted exchange adds exactly one user/assistant pair, in order.
#[tokio::test]
async fn test_conversation_grows_in_pairs() {
    let provider = ScriptedProvider::new()
        .reply("**Wheat** prefers loam.")
        .fail(ProviderError::Api {
            status: 503,
            body: "overloaded".to_string(),
        })
        .reply("* Water early\n* Mulch beds");
    let orchestrator = ChatOrchestrator::new(Arc::new(provider.clone()));

    let inputs = ["Soil for wheat?", "   ", "Fertiliser plan?", "Summer tips?"];
    let mut accepted = 0;

    for input in inputs {
        let before = orchestrator.message_count();
        match orchestrator.submit(input).await {
            Ok(_) => {
                accepted += 1;
                assert_eq!(orchestrator.message_count(), before + 2);
            }
            Err(rejection) => {
                assert_eq!(rejection, SubmitRejection::EmptyInput);
                assert_eq!(orchestrator.message_count(), before);
            }
        }
        assert_eq!(orchestrator.state(), ExchangeState::Idle);
    }

    assert_eq!(accepted, 3);
    assert_eq!(provider.prompts(), vec!["Soil for wheat?", "Fertiliser plan?", "Summer tips?"]);

    let log = orchestrator.snapshot();
    for (index, message) in log.iter().enumerate() {
        let expected = if index % 2 == 0 { Sender::User } else { Sender::Assistant };
        assert_eq!(message.sender, expected);
    }
    for pair in log.windows(2) {
        assert!(pair[0].id < pair[1].id);
        assert!(pair[0].created_at <= pair[1].created_at);
    }
    assert_eq!(log[3].text, FALLBACK_REPLY);
}

/// The renderer's view: snapshot plus per-message parsing.
#[tokio::test]
async fn test_rendering_parses_stored_raw_text() {
    let provider = ScriptedProvider::new().reply("Use ***neem oil***:\n* spray at dusk");
    let orchestrator = ChatOrchestrator::new(Arc::new(provider));
    let mut events = orchestrator.subscribe();

    orchestrator.submit("Aphids on my beans").await.unwrap();

    let mut rendered = Vec::new();
    while let Ok(LogEvent::Appended(message)) = events.try_recv() {
        rendered.push(parse(&message.text));
    }

    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0], vec![FormattedSegment::plain("Aphids on my beans")]);
    assert_eq!(
        rendered[1],
        vec![
            FormattedSegment::plain("Use "),
            FormattedSegment::bold_italic("neem oil"),
            FormattedSegment::plain(":"),
            FormattedSegment::line_break(),
            FormattedSegment::bullet("spray at dusk"),
        ]
    );

    // Stored text keeps its markup
    assert_eq!(orchestrator.snapshot()[1].text, "Use ***neem oil***:\n* spray at dusk");
}

/// A stalled provider behind the bounded-wait wrapper ends in the fallback.
#[tokio::test]
async fn test_timeout_wrapper_turns_stall_into_fallback() {
    let stalled = ScriptedProvider::new().held().reply("late");
    let provider = TimeoutProvider::new(stalled, Duration::from_millis(25));
    let orchestrator = ChatOrchestrator::new(Arc::new(provider));

    let outcome = orchestrator.submit("Is it going to rain?").await.unwrap();

    assert!(matches!(outcome.error(), Some(ProviderError::Timeout(_))));
    assert_eq!(outcome.assistant().text, FALLBACK_REPLY);
    assert_eq!(orchestrator.state(), ExchangeState::Idle);
}

/// Concurrent submitters: exactly one wins, the rest are turned away.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_are_single_flight() {
    let provider = ScriptedProvider::new().held().reply("only one");
    let orchestrator = Arc::new(ChatOrchestrator::new(Arc::new(provider.clone())));

    let mut handles = Vec::new();
    for i in 0..8 {
        let orchestrator = Arc::clone(&orchestrator);
        handles.push(tokio::spawn(async move {
            orchestrator.submit(&format!("question {}", i)).await
        }));
    }

    // Hold the winner until every other submitter has been turned away
    while provider.call_count() == 0
        || handles.iter().filter(|h| h.is_finished()).count() < handles.len() - 1
    {
        tokio::task::yield_now().await;
    }
    provider.release();

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                accepted += 1;
                assert_eq!(outcome.assistant().text, "only one");
            }
            Err(SubmitRejection::AlreadyInFlight) => rejected += 1,
            Err(other) => panic!("unexpected rejection: {:?}", other),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(rejected, 7);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(orchestrator.message_count(), 2);
    assert_eq!(orchestrator.state(), ExchangeState::Idle);
}
