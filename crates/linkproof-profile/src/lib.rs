//! Linkproof Profile: the verification workflow that turns a claimed
//! `(name, username, platform)` into a verified, cross-referenced profile.

pub mod error;
pub mod orchestrator;
pub mod profile;

pub use error::{ErrorKind, ProfileError};
pub use orchestrator::{ProfileVerifier, VerificationStage};
pub use profile::Profile;
