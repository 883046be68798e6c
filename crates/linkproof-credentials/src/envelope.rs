use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use linkproof_core::{Did, SchemaId};
use linkproof_crypto::{hash_hex, sign, KeyPair};

/// Proof type produced by [`CredentialEnvelope::attest`].
pub const ED25519_ATTESTATION: &str = "Ed25519Attestation2024";

/// Proof material attached to a published credential.
///
/// Only the trust chain interprets it; the rest of the pipeline treats it as
/// opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProof {
    /// Proof suite identifier.
    #[serde(rename = "type")]
    pub proof_type: String,
    /// DID of the attester that produced the proof.
    pub attester: String,
    /// Signature over the signing payload (hex-encoded).
    pub signature: String,
}

/// A signed claim as published at a credential collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEnvelope {
    /// DID the claim is about.
    pub subject: Did,
    /// Schema the claim conforms to.
    pub schema_id: SchemaId,
    /// Claim field → value.
    pub contents: BTreeMap<String, serde_json::Value>,
    pub proof: CredentialProof,
}

impl CredentialEnvelope {
    /// Canonical bytes covered by the attester's signature.
    ///
    /// Object keys serialize in sorted order, so equal claims always produce
    /// equal payloads.
    pub fn signing_payload(&self) -> Vec<u8> {
        Self::payload_for(&self.subject, &self.schema_id, &self.contents)
    }

    fn payload_for(
        subject: &Did,
        schema_id: &SchemaId,
        contents: &BTreeMap<String, serde_json::Value>,
    ) -> Vec<u8> {
        let canonical = serde_json::json!({
            "subject": subject.uri(),
            "schemaId": schema_id.as_str(),
            "contents": contents,
        });
        serde_json::to_vec(&canonical).unwrap_or_default()
    }

    /// Content digest of the claim; revocation registries are keyed by it.
    pub fn digest(&self) -> String {
        hash_hex(&self.signing_payload())
    }

    /// String value stored under `key`, if present and a string.
    pub fn content_str(&self, key: &str) -> Option<&str> {
        self.contents.get(key).and_then(|v| v.as_str())
    }

    /// Create and sign an envelope on behalf of `attester`.
    pub fn attest(
        subject: Did,
        schema_id: SchemaId,
        contents: BTreeMap<String, serde_json::Value>,
        attester: &str,
        keypair: &KeyPair,
    ) -> Self {
        let payload = Self::payload_for(&subject, &schema_id, &contents);
        let signature = sign(&payload, keypair);
        Self {
            subject,
            schema_id,
            contents,
            proof: CredentialProof {
                proof_type: ED25519_ATTESTATION.to_string(),
                attester: attester.to_string(),
                signature: signature.to_hex(),
            },
        }
    }
}

/// A credential that passed every verification check.
///
/// Only [`crate::CredentialVerifier`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCredential {
    envelope: CredentialEnvelope,
    attester: String,
}

impl VerifiedCredential {
    pub(crate) fn new(envelope: CredentialEnvelope, attester: String) -> Self {
        Self { envelope, attester }
    }

    pub fn envelope(&self) -> &CredentialEnvelope {
        &self.envelope
    }

    /// Attester as reported by the trust chain.
    pub fn attester(&self) -> &str {
        &self.attester
    }

    pub fn schema_id(&self) -> &SchemaId {
        &self.envelope.schema_id
    }

    pub fn into_envelope(self) -> CredentialEnvelope {
        self.envelope
    }
}
