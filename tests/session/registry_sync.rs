use std::sync::Arc;

use wiremock::MockServer;

use crate::fixtures::{FakeRegistry, document, mount_chat_reply, test_config, wait_until};
use docent::error::{DocentError, RegistryError};
use docent::registry::RegistryChange;
use docent::session::{IngestStatus, Session};

#[tokio::test]
async fn external_insert_refreshes_the_document_list() {
    let server = MockServer::start().await;
    let registry = Arc::new(FakeRegistry::new(vec![document(1, "a.pdf")]));
    let session = Session::with_registry(test_config(&server), registry.clone())
        .await
        .unwrap();

    registry.set_documents(vec![document(2, "b.pdf"), document(1, "a.pdf")]);
    registry
        .announce(RegistryChange::Inserted(document(2, "b.pdf")))
        .await;

    wait_until(|| async { session.snapshot().await.documents.len() == 2 }).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.active_document.as_ref().map(|d| d.id), Some(1));
    assert_eq!(snapshot.status, IngestStatus::Ready);
}

#[tokio::test]
async fn external_delete_of_the_active_document_clears_the_session() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, serde_json::json!("claro")).await;
    let registry = Arc::new(FakeRegistry::new(vec![
        document(2, "b.pdf"),
        document(1, "a.pdf"),
    ]));
    let session = Session::with_registry(test_config(&server), registry.clone())
        .await
        .unwrap();
    session.send_message("hola").await;

    registry.set_documents(vec![document(1, "a.pdf")]);
    registry.announce(RegistryChange::Deleted { id: 2 }).await;

    wait_until(|| async { session.snapshot().await.active_document.is_none() }).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.status, IngestStatus::Idle);
    assert!(snapshot.messages.is_empty());
    assert_eq!(snapshot.documents.len(), 1);
}

#[tokio::test]
async fn duplicate_change_events_are_harmless() {
    let server = MockServer::start().await;
    let registry = Arc::new(FakeRegistry::new(vec![document(1, "a.pdf")]));
    let session = Session::with_registry(test_config(&server), registry.clone())
        .await
        .unwrap();

    registry.set_documents(vec![document(2, "b.pdf"), document(1, "a.pdf")]);
    registry
        .announce(RegistryChange::Inserted(document(2, "b.pdf")))
        .await;
    registry
        .announce(RegistryChange::Inserted(document(2, "b.pdf")))
        .await;

    wait_until(|| async { session.snapshot().await.documents.len() == 2 }).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.documents.len(), 2);
    assert_eq!(snapshot.active_document.as_ref().map(|d| d.id), Some(1));
}

#[tokio::test]
async fn deleting_the_active_document_resets_to_idle() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, serde_json::json!("claro")).await;
    let registry = Arc::new(FakeRegistry::new(vec![
        document(2, "b.pdf"),
        document(1, "a.pdf"),
    ]));
    let session = Session::with_registry(test_config(&server), registry.clone())
        .await
        .unwrap();
    session.send_message("hola").await;

    session.delete_document(2).await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.status, IngestStatus::Idle);
    assert!(snapshot.active_document.is_none());
    assert!(snapshot.messages.is_empty());
    assert_eq!(snapshot.documents.len(), 1);

    session.switch_document(1).await;
    assert!(session.snapshot().await.messages.is_empty());

    // The deleted id is gone from the known list, so switching to it is
    // a no-op.
    session.switch_document(2).await;
    assert_eq!(
        session
            .snapshot()
            .await
            .active_document
            .as_ref()
            .map(|d| d.id),
        Some(1)
    );
}

#[tokio::test]
async fn deleting_an_inactive_document_leaves_the_session_alone() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, serde_json::json!("claro")).await;
    let registry = Arc::new(FakeRegistry::new(vec![
        document(2, "b.pdf"),
        document(1, "a.pdf"),
    ]));
    let session = Session::with_registry(test_config(&server), registry.clone())
        .await
        .unwrap();
    session.send_message("hola").await;

    session.delete_document(1).await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.status, IngestStatus::Ready);
    assert_eq!(snapshot.active_document.as_ref().map(|d| d.id), Some(2));
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.documents.len(), 1);
}

#[tokio::test]
async fn deleting_an_unknown_id_is_a_quiet_noop() {
    let server = MockServer::start().await;
    let registry = Arc::new(FakeRegistry::new(vec![document(1, "a.pdf")]));
    let session = Session::with_registry(test_config(&server), registry.clone())
        .await
        .unwrap();

    let before = session.snapshot().await;
    let fetches = registry.list_calls();

    session.delete_document(99).await.unwrap();

    let after = session.snapshot().await;
    assert_eq!(after.status, before.status);
    assert_eq!(after.active_document, before.active_document);
    assert_eq!(after.documents, before.documents);
    // An id nobody knows triggers no registry traffic, not even a refresh.
    assert_eq!(registry.list_calls(), fetches);
}

#[tokio::test]
async fn rejected_delete_surfaces_the_error_and_keeps_state() {
    let server = MockServer::start().await;
    let registry = Arc::new(FakeRegistry::new(vec![
        document(2, "b.pdf"),
        document(1, "a.pdf"),
    ]));
    let session = Session::with_registry(test_config(&server), registry.clone())
        .await
        .unwrap();
    registry.deny_deletes();

    let err = session.delete_document(2).await.unwrap_err();
    assert!(matches!(
        err,
        DocentError::Registry(RegistryError::Http { status: 403 })
    ));

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.active_document.as_ref().map(|d| d.id), Some(2));
    assert_eq!(snapshot.documents.len(), 2);
    assert_eq!(snapshot.status, IngestStatus::Ready);
}
