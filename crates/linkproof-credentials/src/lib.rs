//! Linkproof Credentials: platform schema registry, credential collection
//! fetcher, trust-chain collaborator, and per-credential verifier.

pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod schema;
pub mod trust_chain;
pub mod verifier;

pub use envelope::{CredentialEnvelope, CredentialProof, VerifiedCredential, ED25519_ATTESTATION};
pub use error::CredentialError;
pub use fetcher::{
    CredentialFetcher, CredentialTransport, HttpTransport, TransportResponse,
    PUBLISHED_CREDENTIALS_SERVICE,
};
pub use schema::{PlatformDescriptor, SchemaRegistry};
pub use trust_chain::{AttestationStatus, SchemaMetadata, SignatureTrustChain, TrustChain};
pub use verifier::CredentialVerifier;
