use std::sync::Arc;

use linkproof_core::{Did, TrustedAttesters};

use crate::envelope::{CredentialEnvelope, VerifiedCredential};
use crate::error::CredentialError;
use crate::trust_chain::TrustChain;

/// Verifies single published credentials against the trust chain.
///
/// Checks run in order and stop at the first failure: schema known,
/// authentic and not revoked, attester trusted, subject bound to the
/// expected DID.
#[derive(Clone)]
pub struct CredentialVerifier {
    trust_chain: Arc<dyn TrustChain>,
}

impl CredentialVerifier {
    pub fn new(trust_chain: Arc<dyn TrustChain>) -> Self {
        Self { trust_chain }
    }

    /// Verify `envelope` and promote it to a [`VerifiedCredential`].
    pub async fn verify(
        &self,
        envelope: CredentialEnvelope,
        trusted_attesters: &TrustedAttesters,
        subject: &Did,
    ) -> Result<VerifiedCredential, CredentialError> {
        let schema = self
            .trust_chain
            .schema(&envelope.schema_id)
            .await?
            .ok_or_else(|| CredentialError::UnsupportedSchema(envelope.schema_id.to_string()))?;

        let status = self.trust_chain.check_attestation(&envelope, &schema).await?;
        if status.revoked {
            return Err(CredentialError::Revoked(format!(
                "{} credential {}",
                schema.title,
                envelope.digest()
            )));
        }

        if !trusted_attesters.contains(&status.attester) {
            return Err(CredentialError::UntrustedIssuer(status.attester));
        }

        if !self.trust_chain.same_subject(&envelope.subject, subject) {
            return Err(CredentialError::SubjectMismatch {
                expected: subject.to_string(),
                actual: envelope.subject.to_string(),
            });
        }

        tracing::debug!(
            schema_id = %envelope.schema_id,
            attester = %status.attester,
            subject = %subject,
            "credential verified"
        );
        Ok(VerifiedCredential::new(envelope, status.attester))
    }
}
