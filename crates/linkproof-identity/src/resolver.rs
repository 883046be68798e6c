use std::sync::Arc;

use linkproof_core::{Did, Web3Name};

use crate::document::DidDocument;
use crate::error::IdentityError;
use crate::ledger::LedgerHandle;

/// Resolves names to DIDs and DIDs to live documents.
///
/// Every call goes to the ledger; nothing is cached.
#[derive(Clone)]
pub struct IdentityResolver {
    ledger: Arc<LedgerHandle>,
}

impl IdentityResolver {
    pub fn new(ledger: Arc<LedgerHandle>) -> Self {
        Self { ledger }
    }

    /// Resolve the DID bound to `name`.
    pub async fn resolve_did(&self, name: &Web3Name) -> Result<Did, IdentityError> {
        match self.ledger.query_did_for_name(name).await? {
            Some(did) => {
                tracing::debug!(name = %name, did = %did, "name resolved");
                Ok(did)
            }
            None => Err(IdentityError::NotFound(format!("no DID bound to name {}", name))),
        }
    }

    /// Resolve `did` to its current document.
    pub async fn resolve_document(&self, did: &Did) -> Result<DidDocument, IdentityError> {
        let resolution = self.ledger.resolve_document(did).await?;
        if resolution.deactivated {
            return Err(IdentityError::Deactivated(did.to_string()));
        }
        match resolution.document {
            Some(document) => {
                if document.id.without_fragment() != did.without_fragment() {
                    tracing::warn!(
                        did = %did,
                        document_id = %document.id,
                        "ledger returned a document for a different DID"
                    );
                    return Err(IdentityError::Upstream(format!(
                        "resolution of {} returned document {}",
                        did, document.id
                    )));
                }
                Ok(document)
            }
            None => Err(IdentityError::NotFound(format!("DID {} is not registered", did))),
        }
    }
}
