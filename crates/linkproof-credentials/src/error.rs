/// Credential system errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("ambiguous configuration: {0}")]
    Conflict(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("malformed credential data: {0}")]
    MalformedData(String),

    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("credential revoked: {0}")]
    Revoked(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("untrusted issuer: {0}")]
    UntrustedIssuer(String),

    #[error("subject mismatch: expected {expected}, credential is about {actual}")]
    SubjectMismatch { expected: String, actual: String },

    #[error("invalid platform registry: {0}")]
    InvalidRegistry(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] linkproof_crypto::CryptoError),
}
