//! Integration test: ledger connection lifecycle and snapshot loading.

use std::sync::Arc;

use linkproof_core::Web3Name;
use linkproof_credentials::{CredentialFetcher, CredentialVerifier, PUBLISHED_CREDENTIALS_SERVICE};
use linkproof_identity::{IdentityError, IdentityResolver, InMemoryLedger, LedgerHandle};
use linkproof_integration_tests::World;
use linkproof_profile::{ErrorKind, ProfileVerifier};

fn snapshot_json() -> serde_json::Value {
    serde_json::json!({
        "names": {
            "buitrago": "did:kilt:4buitrago",
            "retired": "did:kilt:4retired"
        },
        "documents": [{
            "id": "did:kilt:4buitrago",
            "service": [{
                "id": "did:kilt:4buitrago#published-credentials",
                "type": [PUBLISHED_CREDENTIALS_SERVICE],
                "serviceEndpoint": ["https://buitrago.example/credentials.json"]
            }]
        }],
        "deactivated": ["did:kilt:4retired"]
    })
}

#[tokio::test]
async fn test_snapshot_file_seeds_resolution() {
    let path = std::env::temp_dir().join(format!(
        "linkproof-snapshot-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, snapshot_json().to_string()).unwrap();
    let ledger = InMemoryLedger::load(&path);
    std::fs::remove_file(&path).ok();
    let ledger = ledger.expect("snapshot should load");

    let handle = Arc::new(LedgerHandle::new(Arc::new(ledger)));
    handle.init("memory://snapshot").await.unwrap();
    let resolver = IdentityResolver::new(handle.clone());

    let did = resolver
        .resolve_did(&Web3Name::new("buitrago").unwrap())
        .await
        .unwrap();
    let document = resolver.resolve_document(&did).await.unwrap();
    assert_eq!(
        document
            .services_of_type(PUBLISHED_CREDENTIALS_SERVICE)
            .count(),
        1
    );

    let retired = resolver
        .resolve_did(&Web3Name::new("retired").unwrap())
        .await
        .unwrap();
    assert!(matches!(
        resolver.resolve_document(&retired).await,
        Err(IdentityError::Deactivated(_))
    ));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_verification_after_shutdown_is_upstream() {
    let world = World::new();
    world.register_identity("buitrago", "did:kilt:4buitrago", "https://b.example/c");

    let handle = Arc::new(LedgerHandle::new(world.ledger.clone()));
    handle.init("memory://lifecycle").await.unwrap();
    let verifier = ProfileVerifier::new(
        world.registry.clone(),
        IdentityResolver::new(handle.clone()),
        CredentialFetcher::new(world.web.clone()),
        CredentialVerifier::new(world.chain.clone()),
        Arc::new(world.config.clone()),
    );

    handle.shutdown().await.unwrap();
    let err = verifier
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);

    // a shut down handle cannot be revived
    assert!(handle.init("memory://lifecycle").await.is_err());
}

#[tokio::test]
async fn test_uninitialized_ledger_is_upstream() {
    let world = World::new();
    world.register_identity("buitrago", "did:kilt:4buitrago", "https://b.example/c");
    let handle = Arc::new(LedgerHandle::new(world.ledger.clone()));
    let resolver = IdentityResolver::new(handle);
    let err = resolver
        .resolve_did(&Web3Name::new("buitrago").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Upstream(_)));
}
