//! The Linkproof node.
//!
//! Wires the ledger, trust chain, fetcher and profile verifier together and
//! serves them over the HTTP API.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use linkproof_credentials::{
    CredentialFetcher, CredentialVerifier, HttpTransport, SchemaRegistry, SignatureTrustChain,
};
use linkproof_identity::{IdentityResolver, InMemoryLedger, LedgerHandle};
use linkproof_profile::ProfileVerifier;

use crate::api::AppState;
use crate::config::LinkproofConfig;

/// A configured node. `start` connects the ledger, `shutdown` releases it.
pub struct LinkproofNode {
    config: LinkproofConfig,
    ledger: Arc<LedgerHandle>,
    trust_chain: Arc<SignatureTrustChain>,
    verifier: ProfileVerifier,
}

impl LinkproofNode {
    /// Build every component from `config`. Nothing touches the network yet.
    pub fn new(config: LinkproofConfig) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(config.registry()?);
        let trust_chain = Arc::new(Self::build_trust_chain(&config, &registry)?);
        let ledger = Arc::new(LedgerHandle::new(Arc::new(Self::build_ledger(&config)?)));

        let transport = HttpTransport::new(Duration::from_secs(config.fetch.timeout_secs))?;
        let fetcher = CredentialFetcher::new(Arc::new(transport))
            .with_ipfs_gateway(config.fetch.ipfs_gateway.clone());

        let verifier = ProfileVerifier::new(
            registry.clone(),
            IdentityResolver::new(ledger.clone()),
            fetcher,
            CredentialVerifier::new(trust_chain.clone()),
            Arc::new(config.verification_config()),
        );

        tracing::info!(
            platforms = registry.len(),
            trusted_attesters = config.verification.trusted_attesters.len(),
            attester_keys = trust_chain.attester_count(),
            "Linkproof node created"
        );

        Ok(Self {
            config,
            ledger,
            trust_chain,
            verifier,
        })
    }

    fn build_ledger(config: &LinkproofConfig) -> Result<InMemoryLedger> {
        match config.ledger.snapshot_path {
            Some(ref path) => InMemoryLedger::load(path)
                .with_context(|| format!("loading ledger snapshot {}", path.display())),
            None => {
                tracing::warn!("no ledger snapshot configured; every name will be unknown");
                Ok(InMemoryLedger::new())
            }
        }
    }

    fn build_trust_chain(
        config: &LinkproofConfig,
        registry: &SchemaRegistry,
    ) -> Result<SignatureTrustChain> {
        let chain = SignatureTrustChain::from_registry(registry);
        for key in &config.verification.attester_keys {
            chain
                .add_attester_key_hex(&key.attester, &key.public_key)
                .with_context(|| format!("attester key for {}", key.attester))?;
        }
        for digest in &config.verification.revoked_credentials {
            chain.revoke(digest);
        }
        Ok(chain)
    }

    /// Connect to the ledger.
    pub async fn start(&self) -> Result<()> {
        self.ledger.init(&self.config.ledger.address).await?;
        Ok(())
    }

    /// Serve the HTTP API until the listener fails.
    pub async fn serve(&self) -> Result<()> {
        let addr = self.config.api_addr();
        crate::api::start_api_server(&addr, self.app_state()).await
    }

    /// Release the ledger connection. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        self.ledger.shutdown().await?;
        Ok(())
    }

    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(
            self.verifier.clone(),
            self.ledger.clone(),
            self.trust_chain.attester_count(),
        ))
    }
}
