//! Shared fixtures for the Linkproof integration tests.
//!
//! [`World`] stands up an in-memory ledger, an Ed25519 trust chain with two
//! attesters, and a transport serving credential collections from memory, then
//! builds a [`ProfileVerifier`] over them.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use linkproof_core::{Did, TrustedAttesters, UsernameMatch, VerificationConfig, Web3Name};
use linkproof_credentials::{
    CredentialEnvelope, CredentialError, CredentialFetcher, CredentialTransport,
    CredentialVerifier, SchemaRegistry, SignatureTrustChain, TransportResponse,
    PUBLISHED_CREDENTIALS_SERVICE,
};
use linkproof_crypto::KeyPair;
use linkproof_identity::{DidDocument, IdentityResolver, InMemoryLedger, LedgerHandle};
use linkproof_profile::ProfileVerifier;

pub const KILT_ATTESTER: &str = "did:kilt:4pnfkRn5UurBJTW92d9TaVLR2CqJdY4z5HPjrEbpGyBykare";
pub const ROGUE_ATTESTER: &str = "did:kilt:4rogueAttesterNotOnTheTrustList";

/// In-memory stand-in for the web hosting credential collections.
#[derive(Default)]
pub struct MemoryWeb {
    pages: Mutex<HashMap<String, TransportResponse>>,
    requests: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl MemoryWeb {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn serve(&self, url: &str, status: u16, body: Vec<u8>) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), TransportResponse { status, body });
    }

    pub fn publish(&self, url: &str, credentials: &[CredentialEnvelope]) {
        self.serve(url, 200, serde_json::to_vec(credentials).unwrap());
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialTransport for MemoryWeb {
    async fn get(&self, uri: &str) -> Result<TransportResponse, CredentialError> {
        self.requests.lock().unwrap().push(uri.to_string());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let page = self.pages.lock().unwrap().get(uri).cloned();
        page.ok_or_else(|| CredentialError::Upstream(format!("could not connect to {}", uri)))
    }
}

/// A complete verification environment.
pub struct World {
    pub registry: Arc<SchemaRegistry>,
    pub ledger: Arc<InMemoryLedger>,
    pub chain: Arc<SignatureTrustChain>,
    pub web: Arc<MemoryWeb>,
    pub config: VerificationConfig,
    trusted: KeyPair,
    rogue: KeyPair,
}

impl World {
    pub fn new() -> Self {
        Self::with_web(MemoryWeb::default())
    }

    pub fn with_web(web: MemoryWeb) -> Self {
        let registry = Arc::new(SchemaRegistry::builtin());
        let chain = Arc::new(SignatureTrustChain::from_registry(&registry));
        let trusted = KeyPair::generate();
        let rogue = KeyPair::generate();
        chain.add_attester_key(KILT_ATTESTER, trusted.public_key());
        chain.add_attester_key(ROGUE_ATTESTER, rogue.public_key());

        Self {
            registry,
            ledger: Arc::new(InMemoryLedger::new()),
            chain,
            web: Arc::new(web),
            config: VerificationConfig {
                trusted_attesters: TrustedAttesters::new([KILT_ATTESTER]),
                username_match: UsernameMatch::Exact,
            },
            trusted,
            rogue,
        }
    }

    /// Register `name` → `did` with a document publishing its credentials at
    /// `collection_url`.
    pub fn register_identity(&self, name: &str, did: &str, collection_url: &str) -> Did {
        let did = Did::new(did).unwrap();
        self.ledger
            .bind_name(&Web3Name::new(name).unwrap(), did.clone())
            .unwrap();
        self.ledger
            .register_document(DidDocument::new(did.clone()).with_service(
                "published-credentials",
                PUBLISHED_CREDENTIALS_SERVICE,
                collection_url,
            ))
            .unwrap();
        did
    }

    /// A credential for `platform` signed by the trusted attester.
    pub fn credential(&self, subject: &Did, platform: &str, username: &str) -> CredentialEnvelope {
        self.sign(subject, platform, username, KILT_ATTESTER, &self.trusted)
    }

    /// A correctly signed credential from an attester outside the trust list.
    pub fn rogue_credential(
        &self,
        subject: &Did,
        platform: &str,
        username: &str,
    ) -> CredentialEnvelope {
        self.sign(subject, platform, username, ROGUE_ATTESTER, &self.rogue)
    }

    fn sign(
        &self,
        subject: &Did,
        platform: &str,
        username: &str,
        attester: &str,
        keypair: &KeyPair,
    ) -> CredentialEnvelope {
        let descriptor = self.registry.find_by_platform(platform).unwrap();
        CredentialEnvelope::attest(
            subject.clone(),
            descriptor.schema_id.clone(),
            BTreeMap::from([(
                descriptor.contents_key.clone(),
                serde_json::json!(username),
            )]),
            attester,
            keypair,
        )
    }

    /// Connect the ledger and build a verifier over the current state.
    pub async fn verifier(&self) -> ProfileVerifier {
        self.verifier_with_fetcher(CredentialFetcher::new(self.web.clone()))
            .await
    }

    pub async fn verifier_with_fetcher(&self, fetcher: CredentialFetcher) -> ProfileVerifier {
        let handle = Arc::new(LedgerHandle::new(self.ledger.clone()));
        handle.init("memory://integration").await.unwrap();
        ProfileVerifier::new(
            self.registry.clone(),
            IdentityResolver::new(handle),
            fetcher,
            CredentialVerifier::new(self.chain.clone()),
            Arc::new(self.config.clone()),
        )
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
