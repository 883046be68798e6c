use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use linkproof_core::{Did, SchemaId};
use linkproof_crypto::{verify, PublicKey, Signature};

use crate::envelope::{CredentialEnvelope, ED25519_ATTESTATION};
use crate::error::CredentialError;
use crate::schema::SchemaRegistry;

/// Schema metadata as known to the trust chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMetadata {
    pub id: SchemaId,
    pub title: String,
    /// Claim fields every conforming credential carries.
    pub properties: Vec<String>,
}

/// Result of a successful authenticity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationStatus {
    pub revoked: bool,
    /// Attester of record for the credential.
    pub attester: String,
}

/// Oracle deciding whether a credential is authentic, current, and about
/// whom it claims.
#[async_trait]
pub trait TrustChain: Send + Sync {
    /// Look up a schema. `Ok(None)` when the schema is unknown.
    async fn schema(&self, id: &SchemaId) -> Result<Option<SchemaMetadata>, CredentialError>;

    /// Check authenticity and revocation status.
    ///
    /// Fails with [`CredentialError::InvalidSignature`] when the proof does
    /// not hold, or [`CredentialError::Upstream`] when the check itself could
    /// not run.
    async fn check_attestation(
        &self,
        envelope: &CredentialEnvelope,
        schema: &SchemaMetadata,
    ) -> Result<AttestationStatus, CredentialError>;

    /// Whether two DIDs denote the same subject.
    fn same_subject(&self, a: &Did, b: &Did) -> bool;
}

/// Trust chain over Ed25519 attestations.
///
/// Holds attester public keys, known schemas, and revoked credential digests.
pub struct SignatureTrustChain {
    schemas: DashMap<SchemaId, SchemaMetadata>,
    attester_keys: DashMap<String, PublicKey>,
    revoked: DashSet<String>,
}

impl SignatureTrustChain {
    /// Create a trust chain with no schemas, keys, or revocations.
    pub fn new() -> Self {
        Self {
            schemas: DashMap::new(),
            attester_keys: DashMap::new(),
            revoked: DashSet::new(),
        }
    }

    /// Create a trust chain that knows every schema in `registry`.
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        let chain = Self::new();
        for descriptor in registry.all() {
            chain.register_schema(SchemaMetadata {
                id: descriptor.schema_id.clone(),
                title: descriptor.title.clone(),
                properties: vec![descriptor.contents_key.clone()],
            });
        }
        chain
    }

    pub fn register_schema(&self, schema: SchemaMetadata) {
        self.schemas.insert(schema.id.clone(), schema);
    }

    /// Register the public key an attester signs with.
    pub fn add_attester_key(&self, attester: &str, key: PublicKey) {
        self.attester_keys.insert(attester.to_string(), key);
    }

    /// Register a hex-encoded attester key.
    pub fn add_attester_key_hex(&self, attester: &str, key_hex: &str) -> Result<(), CredentialError> {
        let key = PublicKey::from_hex(key_hex)?;
        self.add_attester_key(attester, key);
        Ok(())
    }

    /// Revoke the credential with the given digest.
    pub fn revoke(&self, digest: &str) {
        tracing::debug!(digest = digest, "credential revoked");
        self.revoked.insert(digest.to_string());
    }

    pub fn attester_count(&self) -> usize {
        self.attester_keys.len()
    }
}

impl Default for SignatureTrustChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrustChain for SignatureTrustChain {
    async fn schema(&self, id: &SchemaId) -> Result<Option<SchemaMetadata>, CredentialError> {
        Ok(self.schemas.get(id).map(|entry| entry.clone()))
    }

    async fn check_attestation(
        &self,
        envelope: &CredentialEnvelope,
        schema: &SchemaMetadata,
    ) -> Result<AttestationStatus, CredentialError> {
        let proof = &envelope.proof;
        if proof.proof_type != ED25519_ATTESTATION {
            return Err(CredentialError::InvalidSignature(format!(
                "unsupported proof type {}",
                proof.proof_type
            )));
        }

        let key = self
            .attester_keys
            .get(&proof.attester)
            .map(|entry| entry.clone())
            .ok_or_else(|| {
                CredentialError::InvalidSignature(format!("no key known for {}", proof.attester))
            })?;

        let signature = Signature::from_hex(&proof.signature)
            .map_err(|e| CredentialError::InvalidSignature(e.to_string()))?;
        verify(&envelope.signing_payload(), &signature, &key)
            .map_err(|e| CredentialError::InvalidSignature(e.to_string()))?;

        if let Some(missing) = schema
            .properties
            .iter()
            .find(|p| !envelope.contents.contains_key(*p))
        {
            return Err(CredentialError::InvalidSignature(format!(
                "claim does not conform to schema {}: missing {}",
                schema.id, missing
            )));
        }

        Ok(AttestationStatus {
            revoked: self.revoked.contains(&envelope.digest()),
            attester: proof.attester.clone(),
        })
    }

    fn same_subject(&self, a: &Did, b: &Did) -> bool {
        a.without_fragment() == b.without_fragment()
    }
}
