//! Linkproof Core: Fundamental types, verification settings, and errors
//! shared by every Linkproof crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::{TrustedAttesters, UsernameMatch, VerificationConfig};
pub use error::CoreError;
pub use types::{Did, SchemaId, Web3Name};
