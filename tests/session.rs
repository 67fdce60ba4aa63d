//! Interactive Session Integration Tests
//!
//! Drives the session loop with scripted input and checks its output.

mod common;

use std::time::Duration;

use common::{Reply, ScriptedGateway};
use lexsim::cli::session;
use lexsim::{Court, CourtPhase, ModelOutput, Speaker};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::time::timeout;

async fn run_script(court: &Court, script: &str) -> String {
    let mut out = Vec::new();
    session::run(court, script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_session_generates_phase() {
    let gateway = ScriptedGateway::with_replies([Reply::Text("# Focus of dispute".to_string())]);
    let court = Court::new(gateway.clone());

    let output = run_script(&court, "/phase dispute_focus\n/quit\nignored\n").await;

    assert!(output.contains("Generating..."));
    assert!(output.contains("# Focus of dispute"));
    assert_eq!(gateway.call_count(), 1);
    assert_eq!(
        court.phase_output(CourtPhase::DisputeFocus),
        Some(ModelOutput::text("# Focus of dispute"))
    );
}

#[tokio::test]
async fn test_session_chats_as_selected_role() {
    let reply = Reply::Text("The buyer must prove the defect.".to_string());
    let gateway = ScriptedGateway::with_replies([reply]);
    let court = Court::new(gateway.clone());

    let output = run_script(&court, "/role defendant\nWho has the burden?\n").await;

    assert!(output.contains("Speaking as Defendant."));
    assert!(output.contains("Legal Assistant: The buyer must prove the defect."));
    assert_eq!(gateway.chat_calls()[0].message, "[Role: Defendant] Who has the burden?");
    assert_eq!(court.snapshot().chat.role(), Speaker::Defendant);
}

#[tokio::test]
async fn test_evidence_is_editable_while_phase_generates() {
    let gateway = ScriptedGateway::new();
    let gate = gateway.hold_next();
    let court = Court::new(gateway.clone());
    let (mut input, session_end) = tokio::io::duplex(1024);

    let session = tokio::spawn({
        let court = court.clone();
        async move {
            let mut out = Vec::new();
            session::run(&court, BufReader::new(session_end), &mut out)
                .await
                .map(|_| String::from_utf8(out).unwrap())
        }
    });

    input.write_all(b"/phase dispute_focus\n").await.unwrap();
    gate.entered.notified().await;

    input
        .write_all(b"/evidence add Memo | Late memo | Buyer admitted fault\n")
        .await
        .unwrap();
    timeout(Duration::from_secs(5), async {
        while court.snapshot().evidence.len() != 7 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("evidence was not added while the phase was generating");

    // Still held: the add did not wait for the model
    assert!(court.phase_output(CourtPhase::DisputeFocus).is_none());

    gate.release.notify_one();
    drop(input);
    let output = session.await.unwrap().unwrap();

    assert!(output.contains("Added 'Late memo'"));
    assert!(output.contains("the result was discarded"));
    assert!(court.phase_output(CourtPhase::DisputeFocus).is_none());
    assert!(!court.snapshot().phases.is_generating(CourtPhase::DisputeFocus));
    assert_eq!(court.snapshot().evidence.len(), 7);
}

#[tokio::test]
async fn test_reopening_phase_while_generating() {
    let gateway = ScriptedGateway::new();
    let gate = gateway.hold_next();
    let court = Court::new(gateway.clone());
    let (mut input, session_end) = tokio::io::duplex(1024);

    let session = tokio::spawn({
        let court = court.clone();
        async move {
            let mut out = Vec::new();
            session::run(&court, BufReader::new(session_end), &mut out)
                .await
                .map(|_| String::from_utf8(out).unwrap())
        }
    });

    input.write_all(b"/phase 1\n/phase 1\n").await.unwrap();
    gate.entered.notified().await;
    gate.release.notify_one();
    drop(input);
    let output = session.await.unwrap().unwrap();

    assert!(output.contains("Still generating..."));
    assert_eq!(gateway.call_count(), 1);
    assert_eq!(
        court.phase_output(CourtPhase::CaseChronology),
        Some(ModelOutput::text("generated"))
    );
}

#[tokio::test]
async fn test_session_evidence_commands() {
    let court = Court::new(ScriptedGateway::new());

    let script = "/evidence add Audio | Call recording | Seller promised a refund\n\
                  /evidence add | \n\
                  /evidence\n";
    let output = run_script(&court, script).await;

    assert!(output.contains("Added 'Call recording'"));
    assert!(output.contains("missing required fields"));
    assert!(output.contains("[Audio] Call recording"));
    assert_eq!(court.snapshot().evidence.len(), 7);
}

#[tokio::test]
async fn test_session_reports_bad_input_and_continues() {
    let court = Court::new(ScriptedGateway::new());

    let output = run_script(&court, "/verdict\n/phase 42\n/phase chat\n").await;

    assert!(output.contains("Unknown command '/verdict'"));
    assert!(output.contains("Unknown phase '42'"));
    assert_eq!(court.snapshot().active_phase, CourtPhase::Chat);
}

#[tokio::test]
async fn test_session_opens_case_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("facts.txt");
    std::fs::write(&path, "Landlord kept the deposit.").unwrap();
    let court = Court::new(ScriptedGateway::new());

    let output = run_script(&court, &format!("/new {}\n/context\n", path.display())).await;

    assert!(output.contains("New case opened"));
    assert!(output.contains("Landlord kept the deposit."));
    assert!(court.snapshot().evidence.is_empty());
}
