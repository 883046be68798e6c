//! The profile verification workflow.
//!
//! ```text
//! ValidateInput -> ResolveIdentity -> ResolveDocument -> LocateEndpoint
//!   -> FetchCredentials -> VerifyPrimaryMatch -> VerifyCollection
//!   -> ProjectProfile -> Done
//! ```
//!
//! Every stage up to and including `VerifyPrimaryMatch` is fatal on error and
//! moves the workflow to `Failed`.
//! `VerifyCollection` verifies the remaining credentials concurrently and
//! drops the ones that fail.

use futures::future::join_all;
use std::fmt;
use std::sync::Arc;

use linkproof_core::{Did, VerificationConfig, Web3Name};
use linkproof_credentials::{
    CredentialEnvelope, CredentialFetcher, CredentialVerifier, PlatformDescriptor, SchemaRegistry,
    VerifiedCredential,
};
use linkproof_identity::IdentityResolver;

use crate::error::ProfileError;
use crate::profile::Profile;

/// Stages of a single verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStage {
    ValidateInput,
    ResolveIdentity,
    ResolveDocument,
    LocateEndpoint,
    FetchCredentials,
    VerifyPrimaryMatch,
    VerifyCollection,
    ProjectProfile,
    Done,
    Failed,
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValidateInput => "validate_input",
            Self::ResolveIdentity => "resolve_identity",
            Self::ResolveDocument => "resolve_document",
            Self::LocateEndpoint => "locate_endpoint",
            Self::FetchCredentials => "fetch_credentials",
            Self::VerifyPrimaryMatch => "verify_primary_match",
            Self::VerifyCollection => "verify_collection",
            Self::ProjectProfile => "project_profile",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

struct ValidatedRequest<'a> {
    name: Web3Name,
    username: &'a str,
    platform: &'a PlatformDescriptor,
}

/// Verifies claimed social links of named identities.
///
/// Holds only read-only state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct ProfileVerifier {
    registry: Arc<SchemaRegistry>,
    resolver: IdentityResolver,
    fetcher: CredentialFetcher,
    verifier: CredentialVerifier,
    config: Arc<VerificationConfig>,
}

impl ProfileVerifier {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        resolver: IdentityResolver,
        fetcher: CredentialFetcher,
        verifier: CredentialVerifier,
        config: Arc<VerificationConfig>,
    ) -> Self {
        Self {
            registry,
            resolver,
            fetcher,
            verifier,
            config,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Verify that `username` on `platform` belongs to the identity `name`
    /// and return every verified link of that identity.
    pub async fn verify_profile(
        &self,
        name: &str,
        username: &str,
        platform: &str,
    ) -> Result<Profile, ProfileError> {
        let mut stage = VerificationStage::ValidateInput;
        let result = self.run(name, username, platform, &mut stage).await;
        match &result {
            Ok(profile) => tracing::info!(
                name = name,
                platform = platform,
                links = profile.len(),
                "profile verified"
            ),
            Err(e) => {
                tracing::warn!(
                    name = name,
                    platform = platform,
                    stage = %stage,
                    kind = %e.kind(),
                    error = %e,
                    "profile verification failed"
                );
                advance(&mut stage, VerificationStage::Failed);
            }
        }
        result
    }

    async fn run(
        &self,
        name: &str,
        username: &str,
        platform: &str,
        stage: &mut VerificationStage,
    ) -> Result<Profile, ProfileError> {
        let request = self.validate(name, username, platform)?;

        advance(stage, VerificationStage::ResolveIdentity);
        let did = self.resolver.resolve_did(&request.name).await?;

        advance(stage, VerificationStage::ResolveDocument);
        let document = self.resolver.resolve_document(&did).await?;

        advance(stage, VerificationStage::LocateEndpoint);
        let endpoint = self.fetcher.locate_endpoint(&document)?;

        advance(stage, VerificationStage::FetchCredentials);
        let mut collection = self.fetcher.fetch_endpoint(endpoint).await?;

        advance(stage, VerificationStage::VerifyPrimaryMatch);
        let primary = self.verify_primary(&mut collection, &request, &did).await?;

        advance(stage, VerificationStage::VerifyCollection);
        let secondary = self.verify_collection(collection, &did).await;

        advance(stage, VerificationStage::ProjectProfile);
        let profile = self.project(secondary, primary);

        advance(stage, VerificationStage::Done);
        Ok(profile)
    }

    fn validate<'a>(
        &'a self,
        name: &str,
        username: &'a str,
        platform: &str,
    ) -> Result<ValidatedRequest<'a>, ProfileError> {
        let name = Web3Name::new(name)
            .map_err(|_| ProfileError::InvalidRequest("web3Name must not be empty".into()))?;
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileError::InvalidRequest("username must not be empty".into()));
        }
        if platform.trim().is_empty() {
            return Err(ProfileError::InvalidRequest("platform must not be empty".into()));
        }
        let platform = self.registry.find_by_platform(platform).ok_or_else(|| {
            ProfileError::InvalidRequest(format!("unsupported platform: {}", platform))
        })?;
        Ok(ValidatedRequest {
            name,
            username,
            platform,
        })
    }

    /// Indices of the credentials of the requested platform whose username
    /// claim matches, in collection order.
    fn primary_candidates(
        &self,
        collection: &[CredentialEnvelope],
        request: &ValidatedRequest<'_>,
    ) -> Vec<usize> {
        let descriptor = request.platform;
        let policy = self.config.username_match;
        collection
            .iter()
            .enumerate()
            .filter(|(_, env)| {
                env.schema_id == descriptor.schema_id
                    && env
                        .content_str(&descriptor.contents_key)
                        .is_some_and(|value| policy.matches(request.username, value))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Verify the matching credentials in order and accept the first that
    /// passes. Every candidate tried is removed from `collection`.
    ///
    /// Fails with the first candidate's error when none pass.
    async fn verify_primary(
        &self,
        collection: &mut Vec<CredentialEnvelope>,
        request: &ValidatedRequest<'_>,
        subject: &Did,
    ) -> Result<VerifiedCredential, ProfileError> {
        let descriptor = request.platform;
        let candidates = self.primary_candidates(collection, request);
        let attesters = descriptor.attesters(&self.config.trusted_attesters);

        let mut first_error = None;
        let mut tried = 0;
        let mut accepted = None;
        for &idx in &candidates {
            tried += 1;
            match self
                .verifier
                .verify(collection[idx].clone(), attesters, subject)
                .await
            {
                Ok(verified) => {
                    accepted = Some(verified);
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        platform = %descriptor.name,
                        index = idx,
                        error = %e,
                        "primary candidate rejected"
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        // indices ascend, so remove from the back
        for &idx in candidates[..tried].iter().rev() {
            collection.remove(idx);
        }

        match (accepted, first_error) {
            (Some(verified), _) => Ok(verified),
            (None, Some(e)) => Err(e.into()),
            (None, None) => Err(ProfileError::NoMatch(format!(
                "no {} credential for username {}",
                descriptor.name, request.username
            ))),
        }
    }

    /// Verify every credential of a supported platform; failures are logged
    /// and dropped without affecting the others.
    async fn verify_collection(
        &self,
        candidates: Vec<CredentialEnvelope>,
        subject: &Did,
    ) -> Vec<VerifiedCredential> {
        let tasks = candidates.into_iter().filter_map(|envelope| {
            let Some(descriptor) = self.registry.find_by_schema_id(&envelope.schema_id) else {
                tracing::debug!(schema_id = %envelope.schema_id, "skipping unsupported credential");
                return None;
            };
            let attesters = descriptor.attesters(&self.config.trusted_attesters);
            let platform = descriptor.name.as_str();
            Some(async move {
                (
                    platform,
                    self.verifier.verify(envelope, attesters, subject).await,
                )
            })
        });

        join_all(tasks)
            .await
            .into_iter()
            .filter_map(|(platform, result)| match result {
                Ok(verified) => Some(verified),
                Err(e) => {
                    tracing::warn!(
                        platform = platform,
                        subject = %subject,
                        error = %e,
                        "dropping credential that failed verification"
                    );
                    None
                }
            })
            .collect()
    }

    /// Render verified credentials into links. The primary credential is
    /// applied last so it wins over any other credential of its platform.
    fn project(&self, secondary: Vec<VerifiedCredential>, primary: VerifiedCredential) -> Profile {
        secondary
            .iter()
            .chain(std::iter::once(&primary))
            .filter_map(|credential| {
                let descriptor = self.registry.find_by_schema_id(credential.schema_id())?;
                match credential.envelope().content_str(&descriptor.contents_key) {
                    Some(value) => Some((descriptor.name.clone(), descriptor.render_link(value))),
                    None => {
                        tracing::debug!(
                            platform = %descriptor.name,
                            "verified credential has no string username claim"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

fn advance(stage: &mut VerificationStage, next: VerificationStage) {
    tracing::debug!(from = %stage, to = %next, "verification stage");
    *stage = next;
}
