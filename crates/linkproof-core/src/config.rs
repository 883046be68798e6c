use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::CoreError;

/// How a claimed username is compared against the value inside a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsernameMatch {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Equality after Unicode lower-casing both sides.
    CaseInsensitive,
}

impl UsernameMatch {
    /// Compare a claimed username against a credential value.
    pub fn matches(&self, claimed: &str, credential_value: &str) -> bool {
        match self {
            Self::Exact => claimed == credential_value,
            Self::CaseInsensitive => claimed.to_lowercase() == credential_value.to_lowercase(),
        }
    }
}

/// Allow-list of attester DIDs whose attestations are accepted.
///
/// Membership is an exact string match; no prefixes or wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedAttesters(BTreeSet<String>);

impl TrustedAttesters {
    pub fn new<I, S>(attesters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(attesters.into_iter().map(Into::into).collect())
    }

    /// Parse a comma-separated list (the `TRUSTED_ATTESTER_URIS` format).
    /// Blank entries are ignored.
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, attester: &str) -> bool {
        self.0.contains(attester)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Process-wide verification settings, immutable after startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Attesters trusted for every platform without its own override.
    #[serde(default)]
    pub trusted_attesters: TrustedAttesters,
    /// Username comparison policy.
    #[serde(default)]
    pub username_match: UsernameMatch,
}

impl VerificationConfig {
    /// Reject settings the verifier cannot operate with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.trusted_attesters.is_empty() {
            return Err(CoreError::MissingField(
                "trusted_attesters (TRUSTED_ATTESTER_URIS) must not be empty".into(),
            ));
        }
        Ok(())
    }
}
