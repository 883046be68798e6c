//! Linkproof Identity Layer
//!
//! Resolves human-readable names to DIDs and DIDs to their current
//! documents:
//! - DID documents with typed service endpoints
//! - `LedgerClient` collaborator trait and its process-wide `LedgerHandle`
//! - In-memory ledger backed by a JSON snapshot
//! - `IdentityResolver` mapping ledger outcomes to identity errors

pub mod document;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod resolver;

pub use document::{DidDocument, ServiceEndpoint};
pub use error::IdentityError;
pub use ledger::{DocumentResolution, LedgerClient, LedgerHandle};
pub use memory::{InMemoryLedger, LedgerSnapshot};
pub use resolver::IdentityResolver;
