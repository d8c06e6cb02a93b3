use std::sync::Arc;
use std::time::Duration;

use sitewright::error::{FailureKind, SitewrightError};
use sitewright::formatter::format_html;
use sitewright::session::{BuilderFlow, Phase, Role, SubmitOutcome, GENERATION_ERROR_MESSAGE};

mod common;
use common::FakeGenerator;

fn flow(generator: Arc<FakeGenerator>) -> BuilderFlow {
    BuilderFlow::new(generator, Duration::from_secs(5))
}

/// Seed, then iterate: each update sees the previous document and replaces it
#[tokio::test]
async fn test_seeded_session_then_iteration() {
    let generator = Arc::new(
        FakeGenerator::new()
            .reply("I created a pomodoro timer.", "<html><body>timer v1</body></html>")
            .reply("Added sound alerts.", "<html><body>timer v2</body></html>"),
    );
    let flow = flow(generator.clone());

    let seeded = flow.seed("A pomodoro timer with sound alerts").await;
    assert_eq!(
        seeded,
        Some(SubmitOutcome::Completed {
            summary: "I created a pomodoro timer.".to_string()
        })
    );
    assert!(flow.seed("A pomodoro timer with sound alerts").await.is_none());

    flow.submit("make the alert louder").await;

    let calls = generator.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].current_document, None);
    assert_eq!(
        calls[1].current_document.as_deref(),
        Some("<html><body>timer v1</body></html>")
    );
    assert_eq!(calls[1].history.len(), 2);
    assert_eq!(calls[1].history[0].content, "A pomodoro timer with sound alerts");
    assert_eq!(calls[1].history[1].role, Role::Assistant);

    let snapshot = flow.snapshot();
    assert_eq!(
        snapshot.document.html(),
        Some("<html><body>timer v2</body></html>")
    );
    assert_eq!(snapshot.conversation.len(), 4);
}

/// N successes give 2N turns alternating user and assistant
#[tokio::test]
async fn test_turn_count_and_alternation() {
    let flow = flow(Arc::new(FakeGenerator::new()));
    let prompts = ["a portfolio", "dark mode", "bigger headings", "add a footer"];

    for prompt in prompts {
        assert!(matches!(
            flow.submit(prompt).await,
            SubmitOutcome::Completed { .. }
        ));
    }

    let snapshot = flow.snapshot();
    assert_eq!(snapshot.conversation.len(), prompts.len() * 2);
    for pair in snapshot.conversation.turns().chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
}

/// Every failure kind looks the same to the user
#[tokio::test]
async fn test_all_failures_surface_as_apology() {
    let generator = Arc::new(
        FakeGenerator::new()
            .fail(SitewrightError::EmptyResponse)
            .fail(SitewrightError::MalformedResponse("no html".to_string()))
            .fail(SitewrightError::Transport("connection refused".to_string())),
    );
    let flow = flow(generator);

    let kinds = [
        FailureKind::EmptyResponse,
        FailureKind::MalformedResponse,
        FailureKind::Transport,
    ];
    for kind in kinds {
        assert_eq!(flow.submit("try").await, SubmitOutcome::Failed { kind });
    }

    let snapshot = flow.snapshot();
    assert!(snapshot.document.is_empty());
    assert_eq!(snapshot.phase, Phase::Idle);
    let apologies = snapshot
        .conversation
        .turns()
        .iter()
        .filter(|turn| turn.role == Role::Assistant)
        .filter(|turn| turn.content == GENERATION_ERROR_MESSAGE)
        .count();
    assert_eq!(apologies, 3);
}

/// The session continues normally after a failure
#[tokio::test]
async fn test_session_recovers_after_failure() {
    let generator = Arc::new(
        FakeGenerator::new()
            .fail(SitewrightError::Transport("offline".to_string()))
            .reply("Back online.", "<p>ok</p>"),
    );
    let flow = flow(generator.clone());

    flow.submit("first try").await;
    let outcome = flow.submit("second try").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Completed {
            summary: "Back online.".to_string()
        }
    );
    // The failed attempt produced no document, so the retry starts fresh
    assert_eq!(generator.calls()[1].current_document, None);
}

#[tokio::test]
async fn test_blank_submissions_never_reach_the_generator() {
    let generator = Arc::new(FakeGenerator::new());
    let flow = flow(generator.clone());

    for blank in ["", " ", "\n\n", "\t \t"] {
        assert_eq!(flow.submit(blank).await, SubmitOutcome::Ignored);
    }
    assert!(flow.seed("   ").await.is_none());

    assert!(generator.calls().is_empty());
    assert!(flow.snapshot().conversation.is_empty());
}

/// Generated documents format to a fixpoint
#[tokio::test]
async fn test_generated_document_formats_stably() {
    let generator = Arc::new(FakeGenerator::new().reply(
        "Built a converter.",
        "<!DOCTYPE html><html><head><style>body{margin:0}</style></head><body><main><h1>Converter</h1><input type=\"number\" id=\"amount\"><select id=\"from\"><option>USD</option><option>EUR</option></select></main><script>document.getElementById('amount').focus();</script></body></html>",
    ));
    let flow = flow(generator);
    flow.submit("A currency converter dashboard").await;

    let snapshot = flow.snapshot();
    let html = snapshot.document.html().unwrap();
    let formatted = format_html(html).unwrap();
    assert_eq!(format_html(&formatted).unwrap(), formatted);
    assert!(formatted.contains("\n        <option>USD</option>\n"));
    assert!(formatted.contains("\n    <script>\n      document.getElementById('amount').focus();\n    </script>\n"));
}
