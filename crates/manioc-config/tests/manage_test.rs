//! Delete, detail and publish tests

mod common;

use std::sync::Arc;

use manioc_common::DEFAULT_GROUP;
use manioc_common::crypto::MasterKeyCipher;
use manioc_config::{ConfigEncryptionService, ConfigEntry, TransferError};

use common::{Fixture, RecordingSink, RefusingEncryption, TEST_IP, TEST_NAMESPACE, TEST_USER};

fn entry(group: &str, data_id: &str, content: &str) -> ConfigEntry {
    ConfigEntry {
        data_id: data_id.to_string(),
        group: group.to_string(),
        namespace: TEST_NAMESPACE.to_string(),
        content: content.to_string(),
        created_by: TEST_USER.to_string(),
        ..Default::default()
    }
}

async fn encrypting_fixture() -> Fixture {
    let encryption = ConfigEncryptionService::new(&MasterKeyCipher::generate_base64_key()).unwrap();
    Fixture::with(Arc::new(encryption), RecordingSink::default()).await
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_of_unknown_ids_reports_true_without_events() {
    let fixture = Fixture::new().await;
    assert!(fixture.service.delete_configs(&[41, 42], "127.0.0.1", TEST_USER).await.unwrap());
    assert!(fixture.sink.changed_ids().is_empty());
    assert!(fixture.sink.trace_types().is_empty());
}

#[tokio::test]
async fn test_delete_emits_remove_traces() {
    let fixture = Fixture::new().await;
    let ids = fixture.seed(TEST_NAMESPACE, &[("G", "a", "1"), ("G", "b", "2")]).await;

    assert!(fixture.service.delete_configs(&ids, "172.16.0.3", TEST_USER).await.unwrap());
    assert!(fixture.stored(TEST_NAMESPACE, "G", "a").await.is_none());
    assert!(fixture.stored(TEST_NAMESPACE, "G", "b").await.is_none());

    assert_eq!(fixture.sink.changed_ids(), vec!["a", "b"]);
    assert_eq!(fixture.sink.trace_types(), vec!["remove", "remove"]);
    let traces = fixture.sink.traces.lock().unwrap();
    assert!(traces.iter().all(|t| t.handle_ip == "172.16.0.3"));
    assert!(traces.iter().all(|t| t.content.is_none() && t.request_ip_app.is_none()));
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn test_detail_of_missing_config() {
    let fixture = Fixture::new().await;
    let detail = fixture.service.detail_config("none", "G", TEST_NAMESPACE).await.unwrap();
    assert!(detail.is_none());
}

#[tokio::test]
async fn test_detail_decrypts_content() {
    let fixture = encrypting_fixture().await;
    fixture
        .service
        .publish_config(entry("G", "cipher-db", "password=s3cret"), TEST_IP, None)
        .await
        .unwrap();

    let stored = fixture.stored(TEST_NAMESPACE, "G", "cipher-db").await.unwrap();
    assert_ne!(stored.content, "password=s3cret");
    assert!(!stored.encrypted_data_key.is_empty());

    let detail = fixture
        .service
        .detail_config("cipher-db", "G", TEST_NAMESPACE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.content, "password=s3cret");
    assert_eq!(detail.md5, stored.md5);
}

// ============================================================================
// Publish
// ============================================================================

#[tokio::test]
async fn test_publish_skips_encryption_when_key_supplied() {
    let fixture = encrypting_fixture().await;
    let mut sealed = entry("G", "cipher-db", "already-sealed");
    sealed.encrypted_data_key = "wrapped".to_string();

    assert!(fixture.service.publish_config(sealed, TEST_IP, None).await.unwrap());
    let stored = fixture.stored(TEST_NAMESPACE, "G", "cipher-db").await.unwrap();
    assert_eq!(stored.content, "already-sealed");
    assert_eq!(stored.encrypted_data_key, "wrapped");
}

#[tokio::test]
async fn test_publish_leaves_unmatched_data_ids_plain() {
    let fixture = encrypting_fixture().await;
    fixture
        .service
        .publish_config(entry("G", "app.yaml", "a: 1"), TEST_IP, None)
        .await
        .unwrap();
    let stored = fixture.stored(TEST_NAMESPACE, "G", "app.yaml").await.unwrap();
    assert_eq!(stored.content, "a: 1");
    assert!(stored.encrypted_data_key.is_empty());
}

#[tokio::test]
async fn test_publish_defaults_blank_group() {
    let fixture = Fixture::new().await;
    assert!(fixture.service.publish_config(entry(" ", "a", "1"), TEST_IP, Some("console")).await.unwrap());
    assert!(fixture.stored(TEST_NAMESPACE, DEFAULT_GROUP, "a").await.is_some());

    let traces = fixture.sink.traces.lock().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].persistence_type, "pub");
    assert_eq!(traces[0].handle_ip, "192.168.0.1");
    assert_eq!(traces[0].request_ip_app.as_deref(), Some("console"));
}

#[tokio::test]
async fn test_publish_rejects_blank_data_id() {
    let fixture = Fixture::new().await;
    let err = fixture
        .service
        .publish_config(entry("G", "", "1"), TEST_IP, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::IllegalArgument(_)));
    assert_eq!(fixture.store.calls(), 0);
}

#[tokio::test]
async fn test_publish_encryption_failure_is_not_persisted() {
    let fixture = Fixture::with(
        Arc::new(RefusingEncryption { data_id: "cipher-db" }),
        RecordingSink::default(),
    )
    .await;
    let err = fixture
        .service
        .publish_config(entry("G", "cipher-db", "password=1"), TEST_IP, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Encryption { .. }));
    assert_eq!(fixture.store.calls(), 0);
    assert!(fixture.stored(TEST_NAMESPACE, "G", "cipher-db").await.is_none());
    assert!(fixture.sink.trace_types().is_empty());
}
