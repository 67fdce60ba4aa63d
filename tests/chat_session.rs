//! Chat Session Integration Tests
//!
//! Tests for role-annotated chat, history replay, and send rules.

mod common;

use common::{Reply, ScriptedGateway};
use lexsim::adapters::{ChatTurn, TurnRole};
use lexsim::core::{chat_output, Action, ChatError, Effect};
use lexsim::domain::{CHAT_FALLBACK, EMPTY_CHAT_FALLBACK};
use lexsim::{Court, GatewayError, Notice, Speaker};

#[tokio::test]
async fn test_send_appends_user_then_assistant() {
    let gateway = ScriptedGateway::with_replies([Reply::Text("The seller bears it.".to_string())]);
    let court = Court::new(gateway.clone());
    court.select_role(Speaker::Judge);

    let reply = court.send_chat("Who bears the testing cost?").await.unwrap();
    assert_eq!(reply.role, Speaker::Assistant);
    assert_eq!(reply.content, "The seller bears it.");
    assert!(!reply.failed);

    let state = court.snapshot();
    let transcript = state.chat.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].role, Speaker::Judge);
    assert_eq!(transcript[1].content, "Who bears the testing cost?");
    assert_eq!(transcript[2].id, reply.id);
    assert!(!state.chat.is_pending());

    let calls = gateway.chat_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].message, "[Role: Judge] Who bears the testing cost?");
    assert_eq!(calls[0].context, state.context.as_str());
    assert_eq!(calls[0].history.len(), 1);
    assert_eq!(calls[0].history[0].role, TurnRole::Model);
}

#[tokio::test]
async fn test_history_replays_prior_turns() {
    let gateway = ScriptedGateway::with_replies([
        Reply::Text("First answer".to_string()),
        Reply::Text("Second answer".to_string()),
    ]);
    let court = Court::new(gateway.clone());

    court.send_chat("First question").await.unwrap();
    court.select_role(Speaker::Defendant);
    court.send_chat("Second question").await.unwrap();

    let calls = gateway.chat_calls();
    assert_eq!(calls[1].message, "[Role: Defendant] Second question");
    assert_eq!(
        &calls[1].history[1..],
        &[
            ChatTurn::user("[Role: Plaintiff] First question"),
            ChatTurn::model("First answer"),
        ]
    );
}

#[tokio::test]
async fn test_failed_reply_uses_fallback() {
    let gateway = ScriptedGateway::with_replies([Reply::Fail(429), Reply::Empty]);
    let court = Court::new(gateway);

    let reply = court.send_chat("Is the penalty clause enforceable?").await.unwrap();
    assert_eq!(reply.content, CHAT_FALLBACK);
    assert!(reply.failed);

    let reply = court.send_chat("Try again").await.unwrap();
    assert_eq!(reply.content, EMPTY_CHAT_FALLBACK);

    // Failed replies stay in the transcript; a new send is allowed
    assert_eq!(court.snapshot().chat.transcript().len(), 5);
}

#[test]
fn test_failed_reply_is_reported() {
    let court = Court::new(ScriptedGateway::new());

    let effects = court.dispatch(Action::SubmitChat("Hello".to_string()));
    assert!(matches!(effects.as_slice(), [Effect::Chat(_)]));

    let output = chat_output(Err(GatewayError::EmptyResponse));
    let effects = court.dispatch(Action::ChatFinished(output));
    assert!(matches!(
        effects.as_slice(),
        [Effect::Notify(Notice::ChatFailed { .. })]
    ));
    assert!(!court.snapshot().chat.is_pending());
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let gateway = ScriptedGateway::new();
    let court = Court::new(gateway.clone());

    assert_eq!(court.send_chat("  \n").await.unwrap_err(), ChatError::EmptyMessage);
    assert_eq!(gateway.call_count(), 0);
    assert_eq!(court.snapshot().chat.transcript().len(), 1);
}

#[tokio::test]
async fn test_send_while_pending_is_rejected() {
    let gateway = ScriptedGateway::new();
    let gate = gateway.hold_next();
    let court = Court::new(gateway.clone());

    let pending = tokio::spawn({
        let court = court.clone();
        async move { court.send_chat("First").await }
    });
    gate.entered.notified().await;

    assert!(court.snapshot().chat.is_pending());
    assert_eq!(court.send_chat("Second").await.unwrap_err(), ChatError::Busy);

    gate.release.notify_one();
    let reply = pending.await.unwrap().unwrap();
    assert_eq!(reply.content, "generated");
    assert_eq!(gateway.call_count(), 1);
    assert_eq!(court.snapshot().chat.transcript().len(), 3);
}

#[tokio::test]
async fn test_transcript_survives_new_case() {
    let court = Court::new(ScriptedGateway::new());
    court.send_chat("Before the new case").await.unwrap();

    court.open_case("A different dispute").unwrap();

    assert_eq!(court.snapshot().chat.transcript().len(), 3);
}
