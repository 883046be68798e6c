use linkproof_credentials::CredentialError;
use linkproof_identity::IdentityError;
use std::fmt;

/// Outcome categories of a failed profile verification, stable for
/// transports to map onto response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Deactivated,
    Conflict,
    Upstream,
    MalformedData,
    UnsupportedSchema,
    Revoked,
    InvalidSignature,
    UntrustedIssuer,
    SubjectMismatch,
    NoMatch,
    Configuration,
}

impl ErrorKind {
    /// Snake-case code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::Deactivated => "deactivated",
            Self::Conflict => "conflict",
            Self::Upstream => "upstream",
            Self::MalformedData => "malformed_data",
            Self::UnsupportedSchema => "unsupported_schema",
            Self::Revoked => "revoked",
            Self::InvalidSignature => "invalid_signature",
            Self::UntrustedIssuer => "untrusted_issuer",
            Self::SubjectMismatch => "subject_mismatch",
            Self::NoMatch => "no_match",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by [`crate::ProfileVerifier::verify_profile`].
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("identity deactivated: {0}")]
    Deactivated(String),

    #[error("ambiguous configuration: {0}")]
    Conflict(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("credential revoked: {0}")]
    Revoked(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("untrusted issuer: {0}")]
    UntrustedIssuer(String),

    #[error("subject mismatch: {0}")]
    SubjectMismatch(String),

    #[error("no matching credential: {0}")]
    NoMatch(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ProfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Deactivated(_) => ErrorKind::Deactivated,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Upstream(_) => ErrorKind::Upstream,
            Self::MalformedData(_) => ErrorKind::MalformedData,
            Self::UnsupportedSchema(_) => ErrorKind::UnsupportedSchema,
            Self::Revoked(_) => ErrorKind::Revoked,
            Self::InvalidSignature(_) => ErrorKind::InvalidSignature,
            Self::UntrustedIssuer(_) => ErrorKind::UntrustedIssuer,
            Self::SubjectMismatch(_) => ErrorKind::SubjectMismatch,
            Self::NoMatch(_) => ErrorKind::NoMatch,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

impl From<IdentityError> for ProfileError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(msg) => Self::NotFound(msg),
            IdentityError::Deactivated(msg) => Self::Deactivated(msg),
            IdentityError::Invalid(e) => Self::InvalidRequest(e.to_string()),
            IdentityError::Upstream(msg) | IdentityError::Lifecycle(msg) => Self::Upstream(msg),
            IdentityError::Duplicate(msg) | IdentityError::Serialization(msg) => {
                Self::Configuration(msg)
            }
        }
    }
}

impl From<CredentialError> for ProfileError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NotFound(msg) => Self::NotFound(msg),
            CredentialError::Conflict(msg) => Self::Conflict(msg),
            CredentialError::Upstream(msg) => Self::Upstream(msg),
            CredentialError::MalformedData(msg) => Self::MalformedData(msg),
            CredentialError::UnsupportedSchema(msg) => Self::UnsupportedSchema(msg),
            CredentialError::Revoked(msg) => Self::Revoked(msg),
            CredentialError::InvalidSignature(msg) => Self::InvalidSignature(msg),
            CredentialError::UntrustedIssuer(msg) => Self::UntrustedIssuer(msg),
            e @ CredentialError::SubjectMismatch { .. } => Self::SubjectMismatch(e.to_string()),
            CredentialError::InvalidRegistry(msg) => Self::Configuration(msg),
            CredentialError::Crypto(e) => Self::InvalidSignature(e.to_string()),
        }
    }
}
