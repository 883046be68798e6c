//! Integration test: concurrent verifications and endpoint URI handling.

use std::time::{Duration, Instant};

use linkproof_credentials::CredentialFetcher;
use linkproof_integration_tests::{MemoryWeb, World};
use linkproof_profile::ErrorKind;

#[tokio::test]
async fn test_concurrent_requests_share_one_verifier() {
    let world = World::new();
    let mut expected = Vec::new();
    for i in 0..8 {
        let url = format!("https://user{}.example/credentials.json", i);
        let did = world.register_identity(&format!("user{}", i), &format!("did:kilt:4user{}", i), &url);
        let handle = format!("handle{}", i);
        world.web.publish(
            &url,
            &[
                world.credential(&did, "twitter", &handle),
                world.credential(&did, "github", &format!("gh{}", i)),
            ],
        );
        expected.push(handle);
    }

    let verifier = world.verifier().await;
    let mut tasks = Vec::new();
    for (i, handle) in expected.iter().enumerate() {
        let verifier = verifier.clone();
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            verifier
                .verify_profile(&format!("user{}", i), &handle, "twitter")
                .await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let profile = task.await.unwrap().unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(
            profile.get("github"),
            Some(format!("https://github.com/gh{}", i).as_str())
        );
    }
}

#[tokio::test]
async fn test_failed_verifications_do_not_affect_neighbours() {
    let world = World::new();
    let did = world.register_identity("good", "did:kilt:4good", "https://good.example/c");
    world
        .web
        .publish("https://good.example/c", &[world.credential(&did, "twitter", "good")]);
    world.register_identity("down", "did:kilt:4down", "https://down.example/c");

    let verifier = world.verifier().await;
    let (good, down) = futures::join!(
        verifier.verify_profile("good", "good", "twitter"),
        verifier.verify_profile("down", "down", "twitter"),
    );
    assert!(good.is_ok());
    assert_eq!(down.unwrap_err().kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn test_ipfs_endpoint_goes_through_gateway() {
    let world = World::new();
    let did = world.register_identity("buitrago", "did:kilt:4buitrago", "ipfs://QmCollection");
    world.web.publish(
        "https://gateway.example/ipfs/QmCollection",
        &[world.credential(&did, "twitter", "briefboards")],
    );

    let fetcher =
        CredentialFetcher::new(world.web.clone()).with_ipfs_gateway("https://gateway.example/ipfs");
    let verifier = world.verifier_with_fetcher(fetcher).await;
    let profile = verifier
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap();
    assert_eq!(profile.len(), 1);
    assert_eq!(
        world.web.requests(),
        vec!["https://gateway.example/ipfs/QmCollection".to_string()]
    );
}

#[tokio::test]
async fn test_unsupported_endpoint_scheme_is_malformed() {
    let world = World::new();
    world.register_identity("buitrago", "did:kilt:4buitrago", "ftp://files.example/c");
    let err = world
        .verifier()
        .await
        .verify_profile("buitrago", "briefboards", "twitter")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedData);
    assert!(world.web.requests().is_empty());
}

#[tokio::test]
async fn test_requests_overlap_in_time() {
    let world = World::with_web(MemoryWeb::with_latency(Duration::from_millis(200)));
    for name in ["alpha", "beta", "gamma", "delta"] {
        let url = format!("https://{}.example/c", name);
        let did = world.register_identity(name, &format!("did:kilt:4{}", name), &url);
        world
            .web
            .publish(&url, &[world.credential(&did, "twitter", name)]);
    }

    let verifier = world.verifier().await;
    let started = Instant::now();
    let results = futures::future::join_all(
        ["alpha", "beta", "gamma", "delta"]
            .iter()
            .map(|name| verifier.verify_profile(name, name, "twitter")),
    )
    .await;
    assert!(results.iter().all(Result::is_ok));
    // four sequential fetches would take at least 800ms
    assert!(started.elapsed() < Duration::from_millis(700));
}
