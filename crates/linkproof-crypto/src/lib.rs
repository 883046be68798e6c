//! Linkproof Crypto: Ed25519 keys and signatures for credential
//! attestations, plus BLAKE3 digests for schema ids and revocation lookups.

pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::{hash, hash_hex, Hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature};
