#[path = "../../finrag_client/tests/support/mod.rs"]
mod support;

use finrag_client::Config;
use finrag_console::{Flow, RenderStyle, Shell, ShellEvent, Tab};
use serde_json::json;
use support::Backend;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

async fn shell(backend: &Backend) -> (Shell, UnboundedReceiver<ShellEvent>) {
    let url = backend.spawn().await;
    let (tx, rx) = unbounded_channel();
    (Shell::new(&Config::default(), &url, tx), rx)
}

async fn settle(shell: &mut Shell, rx: &mut UnboundedReceiver<ShellEvent>) {
    while shell.has_pending_work() {
        let event = rx.recv().await.expect("event channel closed");
        shell.apply(event).await;
    }
}

#[tokio::test]
async fn chat_line_is_answered_through_events() {
    let backend = Backend::new();
    backend.with(|s| {
        s.chat_reply = Some(json!({ "response": "Revenue was $5M", "sources": ["Agent used: financial"] }))
    });
    let (mut shell, mut rx) = shell(&backend).await;

    assert_eq!(shell.handle_line("What is revenue?").await, Flow::Render);
    assert!(shell.chat().is_pending());
    assert!(shell.render(RenderStyle::plain()).contains("[bot] ..."));

    settle(&mut shell, &mut rx).await;
    let text = shell.render(RenderStyle::plain());
    assert!(text.starts_with("[Chat]"));
    assert!(text.contains("Revenue was $5M"));
    assert!(text.contains("(financial agent)"));
    assert!(!text.contains("[bot] ..."));

    let requests = backend.with(|s| s.chat_requests.clone());
    assert_eq!(requests, vec![json!({ "message": "What is revenue?", "session_id": "default" })]);
}

#[tokio::test]
async fn blank_line_does_nothing() {
    let backend = Backend::new();
    let (mut shell, _rx) = shell(&backend).await;
    shell.switch_to(Tab::Documents).await;

    assert_eq!(shell.handle_line("   ").await, Flow::Render);
    assert_eq!(shell.active(), Tab::Documents);
    assert!(!shell.has_pending_work());
    assert!(backend.with(|s| s.chat_requests.is_empty()));
}

#[tokio::test]
async fn chat_from_another_tab_switches_to_chat() {
    let backend = Backend::new();
    let (mut shell, mut rx) = shell(&backend).await;
    shell.switch_to(Tab::Metrics).await;
    assert!(shell.is_polling());

    shell.handle_line("hello").await;
    assert_eq!(shell.active(), Tab::Chat);
    assert!(!shell.is_polling());
    settle(&mut shell, &mut rx).await;
    assert!(shell.render(RenderStyle::plain()).contains("echo: hello"));
}

#[tokio::test]
async fn metrics_tab_owns_the_poller() {
    let backend = Backend::new();
    backend.with(|s| s.metrics = json!({ "total_queries": 7 }));
    let (mut shell, _rx) = shell(&backend).await;
    assert!(!shell.is_polling());

    shell.handle_line("/tab metrics").await;
    assert!(shell.is_polling());
    shell.metrics_updated().await;
    let text = shell.render(RenderStyle::plain());
    assert!(text.contains("[Metrics]"));
    assert!(text.contains("Total Queries       7"));

    shell.handle_line("/chat").await;
    assert!(!shell.is_polling());
    let calls = backend.with(|s| s.metrics_calls);
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn upload_and_delete_refresh_document_list() {
    let backend = Backend::new();
    let (mut shell, mut rx) = shell(&backend).await;
    shell.handle_line("/documents").await;
    assert!(shell.render(RenderStyle::plain()).contains("No documents uploaded yet"));

    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("q1.pdf");
    let b = dir.path().join("notes.txt");
    std::fs::write(&a, "quarterly report body").unwrap();
    std::fs::write(&b, "notes").unwrap();

    let line = format!("/upload {} {}", a.display(), b.display());
    shell.handle_line(&line).await;
    assert!(shell.documents().is_uploading());
    assert!(shell.render(RenderStyle::plain()).contains("Uploading document..."));
    settle(&mut shell, &mut rx).await;

    assert_eq!(backend.with(|s| s.uploads.len()), 2);
    let text = shell.render(RenderStyle::plain());
    assert!(text.contains("Document uploaded successfully!"));
    assert!(text.contains("q1.pdf"));
    assert!(text.contains("notes.txt"));

    let q1 = backend.with(|s| {
        s.docs
            .iter()
            .find(|d| d["filename"] == "q1.pdf")
            .and_then(|d| d["id"].as_i64())
            .unwrap()
    });
    shell.handle_line(&format!("/delete {}", q1)).await;
    assert!(shell.documents().is_deleting());
    settle(&mut shell, &mut rx).await;
    let text = shell.render(RenderStyle::plain());
    assert!(!text.contains("q1.pdf"));
    assert!(text.contains("notes.txt"));
    assert_eq!(backend.with(|s| s.delete_calls), 1);
}

#[tokio::test]
async fn refresh_refetches_documents() {
    let backend = Backend::new();
    let (mut shell, _rx) = shell(&backend).await;
    shell.switch_to(Tab::Documents).await;
    backend.add_document("late.pdf", "pdf", 3);
    assert!(!shell.render(RenderStyle::plain()).contains("late.pdf"));

    shell.handle_line("/refresh").await;
    assert!(shell.render(RenderStyle::plain()).contains("late.pdf"));
    assert_eq!(backend.with(|s| s.list_calls), 2);
}

#[tokio::test]
async fn retry_resends_failed_message() {
    let backend = Backend::new();
    backend.with(|s| s.chat_error = Some("agent crashed".into()));
    let (mut shell, mut rx) = shell(&backend).await;

    assert_eq!(
        shell.handle_line("/retry").await,
        Flow::Print("Nothing to retry.".to_string())
    );

    shell.handle_line("Compare Q1 and Q2").await;
    settle(&mut shell, &mut rx).await;
    assert!(shell.render(RenderStyle::plain()).contains("agent crashed"));

    backend.with(|s| s.chat_error = None);
    shell.handle_line("/retry").await;
    settle(&mut shell, &mut rx).await;
    let text = shell.render(RenderStyle::plain());
    assert!(text.contains("echo: Compare Q1 and Q2"));
    assert!(!text.contains("not delivered"));
    assert_eq!(backend.with(|s| s.chat_requests.len()), 2);
}

#[tokio::test]
async fn bad_commands_print_and_quit_quits() {
    let backend = Backend::new();
    let (mut shell, _rx) = shell(&backend).await;

    let Flow::Print(text) = shell.handle_line("/tab nowhere").await else {
        panic!("expected an error message");
    };
    assert!(text.contains("unknown tab"));
    assert!(matches!(shell.handle_line("/help").await, Flow::Print(h) if h.contains("/upload")));
    assert_eq!(shell.handle_line("/quit").await, Flow::Quit);
}
