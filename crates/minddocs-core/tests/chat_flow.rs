mod common;

use common::{Reply, StubServer};
use minddocs_core::chat::{self, Applied, StreamOutcome};
use minddocs_core::{ChatController, ChatEvent, ChatMode, ChatPhase, Sender};
use serde_json::json;
use tokio::sync::mpsc;

/// Run the submission to completion and feed every event back into the
/// controller, recording the ai entry's text after each one.
async fn drive(client: minddocs_core::ApiClient, chat: &mut ChatController, question: &str) -> Vec<String> {
    let submission = chat.submit(question).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = chat::spawn_submission(client, submission, move |event| {
        let _ = tx.send(event);
    });

    let mut seen = Vec::new();
    while let Some(event) = rx.recv().await {
        let finished = matches!(chat.apply(event), Applied::Finished(_));
        if let Some(last) = chat.transcript().last() {
            seen.push(last.text.clone());
        }
        if finished {
            break;
        }
    }
    handle.await.unwrap();
    seen
}

#[tokio::test]
async fn test_streamed_reply_accumulates() {
    let server = StubServer::start(|request| {
        assert_eq!(request.path, "/chatbot/chat/stream");
        Reply::chunks(&["The ", "invoice ", "total ", "is ", "$42."])
    })
    .await;
    let (client, session) = server.client();
    session.login("tok").unwrap();

    let mut chat = ChatController::new();
    chat.set_mode(ChatMode::Streaming);
    chat.select(vec!["Q1 Report".to_string()]);

    let seen = drive(client, &mut chat, "What is the total?").await;

    let final_text = chat.transcript().last().unwrap().text.clone();
    assert_eq!(final_text, "The invoice total is $42.");
    for state in &seen {
        assert!(final_text.starts_with(state.as_str()));
    }
    assert_eq!(chat.transcript().len(), 2);
    assert_eq!(chat.transcript().entries()[0].sender, Sender::User);
    assert_eq!(chat.phase(), ChatPhase::Idle);
    assert_eq!(chat.error(), None);

    let request = server.last_request();
    assert_eq!(request.header("authorization"), Some("Bearer tok"));
    let body = request.body_text();
    assert!(body.contains("name=\"doc_name\""));
    assert!(body.contains("What is the total?"));
}

#[tokio::test]
async fn test_multibyte_split_across_chunks() {
    let server = StubServer::start(|_| Reply::Chunks(vec![b"caf\xC3".to_vec(), b"\xA9 ok".to_vec()])).await;
    let (client, _session) = server.client();

    let mut chat = ChatController::new();
    chat.set_mode(ChatMode::Streaming);
    chat.select(vec!["Menu".to_string()]);
    drive(client, &mut chat, "name?").await;

    assert_eq!(chat.transcript().last().unwrap().text, "café ok");
}

#[tokio::test]
async fn test_rejected_stream_shows_detail() {
    let server = StubServer::start(|_| Reply::detail(404, "Document not found.")).await;
    let (client, _session) = server.client();

    let mut chat = ChatController::new();
    chat.set_mode(ChatMode::Streaming);
    chat.select(vec!["Gone".to_string()]);
    drive(client, &mut chat, "hello").await;

    assert_eq!(chat.error(), Some("Document not found."));
    assert!(!chat.is_busy());
}

#[tokio::test]
async fn test_single_reply_over_several_documents() {
    let server = StubServer::start(|_| Reply::ok(json!({"reply": "Both mention revenue."}))).await;
    let (client, _session) = server.client();

    let mut chat = ChatController::new();
    chat.select(vec!["A".to_string(), "B".to_string()]);
    drive(client, &mut chat, "What do they share?").await;

    let texts: Vec<&str> = chat.transcript().entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["What do they share?", "Both mention revenue."]);

    let request = server.last_request();
    assert_eq!(request.path, "/chatbot/chat");
    assert_eq!(request.body_text().matches("name=\"doc_names\"").count(), 2);
}

#[tokio::test]
async fn test_failed_reply_keeps_question() {
    let server = StubServer::start(|_| Reply::Text(500, "Internal Server Error".to_string())).await;
    let (client, _session) = server.client();

    let mut chat = ChatController::new();
    chat.select(vec!["A".to_string(), "B".to_string()]);
    drive(client, &mut chat, "anything?").await;

    assert_eq!(chat.transcript().len(), 1);
    assert_eq!(chat.transcript().entries()[0].text, "anything?");
    assert_eq!(chat.error(), Some(chat::REPLY_FAILED));
}

#[tokio::test]
async fn test_history_loaded_on_selection() {
    let server = StubServer::start(|_| {
        Reply::ok(json!([
            {"question": "q1", "answer": "a1"},
            {"question": "q2", "answer": "a2"}
        ]))
    })
    .await;
    let (client, _session) = server.client();

    let mut chat = ChatController::new();
    let request = chat.select(vec!["Q1 Report".to_string()]).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    chat::spawn_history(client, request, move |event| {
        let _ = tx.send(event);
    })
    .await
    .unwrap();

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, ChatEvent::History { .. }));
    assert_eq!(chat.apply(event), Applied::Updated);
    assert_eq!(chat.transcript().len(), 4);
    assert_eq!(chat.transcript().entries()[3].text, "a2");
}

#[tokio::test]
async fn test_abandoned_stream_leaves_no_trace() {
    let server = StubServer::start(|_| Reply::chunks(&["late ", "answer"])).await;
    let (client, _session) = server.client();

    let mut chat = ChatController::new();
    chat.set_mode(ChatMode::Streaming);
    chat.select(vec!["A".to_string()]);
    let submission = chat.submit("q").unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = chat::spawn_submission(client, submission, move |event| {
        let _ = tx.send(event);
    });

    // the user picks another document before anything arrives
    chat.select(vec!["B".to_string()]);
    handle.abort();

    while let Some(event) = rx.recv().await {
        assert_ne!(chat.apply(event), Applied::Finished(StreamOutcome::Done));
    }
    assert!(chat.transcript().is_empty());
    assert_eq!(chat.selection(), &["B".to_string()]);
}
