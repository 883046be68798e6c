/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("DID deactivated: {0}")]
    Deactivated(String),

    #[error("ledger error: {0}")]
    Upstream(String),

    #[error("ledger lifecycle error: {0}")]
    Lifecycle(String),

    #[error("duplicate entry: {0}")]
    Duplicate(String),

    #[error("invalid identifier: {0}")]
    Invalid(#[from] linkproof_core::CoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}
