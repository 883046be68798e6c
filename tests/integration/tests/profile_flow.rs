//! Integration test: name → DID → document → collection → verified profile.

use std::sync::Arc;

use linkproof_core::{TrustedAttesters, UsernameMatch};
use linkproof_credentials::{SchemaRegistry, PUBLISHED_CREDENTIALS_SERVICE};
use linkproof_identity::DidDocument;
use linkproof_integration_tests::{World, KILT_ATTESTER, ROGUE_ATTESTER};
use linkproof_profile::ErrorKind;

const COLLECTION: &str = "https://buitrago.example/credentials.json";

// =========================================================================
// Happy paths
// =========================================================================

#[tokio::test]
async fn test_verify_single_account() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world
        .web
        .publish(COLLECTION, &[world.credential(&did, "twitter", "briefboards")]);

    let verifier = world.verifier().await;
    let profile = verifier
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .expect("profile should verify");

    assert_eq!(profile.len(), 1);
    assert_eq!(profile.get("twitter"), Some("https://twitter.com/briefboards"));
    assert_eq!(world.web.requests(), vec![COLLECTION.to_string()]);
}

#[tokio::test]
async fn test_profile_cross_references_every_verified_account() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world.web.publish(
        COLLECTION,
        &[
            world.credential(&did, "twitter", "briefboards"),
            world.credential(&did, "github", "buitrago"),
            world.credential(&did, "discord", "1029384756"),
            world.credential(&did, "youtube", "UCxyz"),
        ],
    );

    let verifier = world.verifier().await;
    // any verified account yields the same profile
    let via_twitter = verifier
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap();
    let via_github = verifier
        .verify_profile("buitrago", "buitrago", "GitHub")
        .await
        .unwrap();

    assert_eq!(via_twitter, via_github);
    assert_eq!(
        via_twitter.platforms().collect::<Vec<_>>(),
        vec!["discord", "github", "twitter", "youtube"]
    );
    assert_eq!(
        via_twitter.get("discord"),
        Some("https://discord.com/users/1029384756")
    );
    assert_eq!(
        via_twitter.get("youtube"),
        Some("https://www.youtube.com/channel/UCxyz")
    );
}

#[tokio::test]
async fn test_profile_serializes_as_flat_map() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world.web.publish(
        COLLECTION,
        &[
            world.credential(&did, "twitter", "briefboards"),
            world.credential(&did, "email", "hello@buitrago.example"),
        ],
    );

    let profile = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&profile).unwrap(),
        serde_json::json!({
            "email": "mailto:hello@buitrago.example",
            "twitter": "https://twitter.com/briefboards",
        })
    );
}

// =========================================================================
// Identity failures
// =========================================================================

#[tokio::test]
async fn test_unregistered_name_is_not_found() {
    let world = World::new();
    let err = world
        .verifier()
        .await
        .verify_profile("ghost", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(world.web.requests().is_empty());
}

#[tokio::test]
async fn test_deactivated_did_is_reported() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world.ledger.deactivate(&did).unwrap();
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deactivated);
}

#[tokio::test]
async fn test_document_without_credential_endpoint() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world
        .ledger
        .register_document(DidDocument::new(did).with_service(
            "linked-domain",
            "LinkedDomains",
            "https://buitrago.example",
        ))
        .unwrap();
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_multiple_credential_endpoints_conflict() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world
        .ledger
        .register_document(
            DidDocument::new(did.clone())
                .with_service("one", PUBLISHED_CREDENTIALS_SERVICE, COLLECTION)
                .with_service("two", PUBLISHED_CREDENTIALS_SERVICE, "ipfs://QmOther"),
        )
        .unwrap();
    world
        .web
        .publish(COLLECTION, &[world.credential(&did, "twitter", "briefboards")]);

    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(world.web.requests().is_empty());
}

// =========================================================================
// Collection failures
// =========================================================================

#[tokio::test]
async fn test_unreachable_collection_is_upstream() {
    let world = World::new();
    world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn test_malformed_collections_rejected() {
    for body in [
        b"<html>not json</html>".to_vec(),
        b"[]".to_vec(),
        br#"[{"schemaId": "0x1", "contents": {}}]"#.to_vec(),
    ] {
        let world = World::new();
        world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
        world.web.serve(COLLECTION, 200, body);
        let err = world
            .verifier()
            .await
            .verify_profile("buitrago", "briefboards", "twitter")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);
    }
}

// =========================================================================
// Primary credential
// =========================================================================

#[tokio::test]
async fn test_claimed_username_not_in_collection() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world.web.publish(
        COLLECTION,
        &[
            world.credential(&did, "twitter", "briefboards"),
            world.credential(&did, "github", "impostor"),
        ],
    );
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "impostor", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatch);
}

#[tokio::test]
async fn test_untrusted_primary_is_fatal() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world.web.publish(
        COLLECTION,
        &[world.rogue_credential(&did, "twitter", "briefboards")],
    );
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UntrustedIssuer);
    assert!(err.to_string().contains(ROGUE_ATTESTER));
}

#[tokio::test]
async fn test_primary_bound_to_other_did_is_fatal() {
    let world = World::new();
    world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    let stranger = world.register_identity("stranger", "did:kilt:4stranger", "https://x.example/c");
    world.web.publish(
        COLLECTION,
        &[world.credential(&stranger, "twitter", "briefboards")],
    );
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SubjectMismatch);
}

#[tokio::test]
async fn test_revoked_primary_is_fatal() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    let twitter = world.credential(&did, "twitter", "briefboards");
    world.chain.revoke(&twitter.digest());
    world.web.publish(COLLECTION, &[twitter]);
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Revoked);
}

#[tokio::test]
async fn test_bad_primary_copies_do_not_shadow_a_valid_one() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    let stranger = world.register_identity("stranger", "did:kilt:4stranger", "https://x.example/c");
    world.web.publish(
        COLLECTION,
        &[
            world.rogue_credential(&did, "twitter", "briefboards"),
            world.credential(&stranger, "twitter", "briefboards"),
            world.credential(&did, "twitter", "briefboards"),
            world.credential(&did, "github", "buitrago"),
        ],
    );
    let profile = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .expect("the valid copy should be accepted");
    assert_eq!(profile.get("twitter"), Some("https://twitter.com/briefboards"));
    assert_eq!(profile.get("github"), Some("https://github.com/buitrago"));
    assert_eq!(profile.len(), 2);
}

#[tokio::test]
async fn test_case_insensitive_matching_by_config() {
    let mut world = World::new();
    world.config.username_match = UsernameMatch::CaseInsensitive;
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world
        .web
        .publish(COLLECTION, &[world.credential(&did, "twitter", "BriefBoards")]);

    let profile = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap();
    assert_eq!(profile.get("twitter"), Some("https://twitter.com/BriefBoards"));
}

// =========================================================================
// Secondary credentials
// =========================================================================

#[tokio::test]
async fn test_bad_secondaries_are_dropped_not_fatal() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    let other = world.register_identity("other", "did:kilt:4other", "https://o.example/c");

    let revoked = world.credential(&did, "twitch", "oldstream");
    world.chain.revoke(&revoked.digest());
    let mut tampered = world.credential(&did, "telegram", "buitrago_tg");
    tampered
        .contents
        .insert("Username".into(), serde_json::json!("hijacker"));

    world.web.publish(
        COLLECTION,
        &[
            world.credential(&did, "github", "buitrago"),
            world.rogue_credential(&did, "discord", "1234"),
            revoked,
            world.credential(&other, "youtube", "UCother"),
            tampered,
            world.credential(&did, "twitter", "briefboards"),
            world.credential(&did, "email", "hello@buitrago.example"),
        ],
    );

    let profile = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap();
    assert_eq!(
        profile.platforms().collect::<Vec<_>>(),
        vec!["email", "github", "twitter"]
    );
}

#[tokio::test]
async fn test_platform_specific_trust_list() {
    let mut descriptors: Vec<_> = SchemaRegistry::builtin().all().cloned().collect();
    for descriptor in &mut descriptors {
        if descriptor.name == "discord" {
            descriptor.trusted_attesters =
                Some(TrustedAttesters::new([KILT_ATTESTER, ROGUE_ATTESTER]));
        }
    }
    let mut world = World::new();
    world.registry = Arc::new(SchemaRegistry::from_descriptors(descriptors).unwrap());

    let did = world.register_identity("buitrago", "did:kilt:4buitrago", COLLECTION);
    world.web.publish(
        COLLECTION,
        &[
            world.credential(&did, "twitter", "briefboards"),
            world.rogue_credential(&did, "discord", "1234"),
            world.rogue_credential(&did, "github", "buitrago"),
        ],
    );

    let profile = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap();
    assert_eq!(
        profile.platforms().collect::<Vec<_>>(),
        vec!["discord", "twitter"]
    );
}
