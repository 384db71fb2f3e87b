use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::fixtures::{FakeRegistry, document, mount_chat_reply, test_config, wait_until};
use docent::chat::ERROR_REPLY;
use docent::conversation::MessageRole;
use docent::session::{IngestStatus, Session};

async fn single_document_session(server: &MockServer) -> Session {
    let registry = Arc::new(FakeRegistry::new(vec![document(1, "informe.pdf")]));
    Session::with_registry(test_config(server), registry)
        .await
        .unwrap()
}

#[tokio::test]
async fn send_appends_user_turn_and_normalized_reply() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, serde_json::json!([{ "output": "Hola\\nMundo" }])).await;
    let session = single_document_session(&server).await;

    session.send_message("hola").await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[0].role, MessageRole::User);
    assert_eq!(snapshot.messages[0].content, "hola");
    assert_eq!(snapshot.messages[1].role, MessageRole::Assistant);
    assert_eq!(snapshot.messages[1].content, "Hola\nMundo");
    assert!(!snapshot.thinking);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["filename"], "informe.pdf");
    assert_eq!(
        body["conversationId"].as_str(),
        Some(snapshot.conversation_id.as_str())
    );
}

#[tokio::test]
async fn blank_input_is_rejected_without_side_effects() {
    let server = MockServer::start().await;
    let session = single_document_session(&server).await;

    session.send_message("   ").await;

    let snapshot = session.snapshot().await;
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.thinking);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn send_is_ignored_while_no_document_is_ready() {
    let server = MockServer::start().await;
    let registry = Arc::new(FakeRegistry::new(Vec::new()));
    let session = Session::with_registry(test_config(&server), registry)
        .await
        .unwrap();

    session.send_message("hola").await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.status, IngestStatus::Idle);
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.thinking);
}

#[tokio::test]
async fn failed_turn_appends_the_error_apology_instead_of_raising() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let session = single_document_session(&server).await;

    session.send_message("hola").await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[0].role, MessageRole::User);
    assert_eq!(snapshot.messages[1].content, ERROR_REPLY);
    assert!(!snapshot.thinking);
}

#[tokio::test]
async fn user_turn_is_visible_while_the_reply_is_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!("listo"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let session = Arc::new(single_document_session(&server).await);

    let sender = session.clone();
    let turn = tokio::spawn(async move { sender.send_message("hola").await });

    wait_until(|| async {
        let snapshot = session.snapshot().await;
        snapshot.thinking && snapshot.messages.len() == 1
    })
    .await;
    assert_eq!(
        session.snapshot().await.messages[0].role,
        MessageRole::User
    );

    turn.await.unwrap();
    let snapshot = session.snapshot().await;
    assert!(!snapshot.thinking);
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[1].content, "listo");
}
