use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use linkproof_core::{Did, Web3Name};

use crate::document::DidDocument;
use crate::error::IdentityError;
use crate::ledger::{DocumentResolution, LedgerClient};

/// Serialized ledger state used to seed an [`InMemoryLedger`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Name → DID bindings.
    #[serde(default)]
    pub names: BTreeMap<String, Did>,
    /// Live documents.
    #[serde(default)]
    pub documents: Vec<DidDocument>,
    /// DIDs that existed but were deactivated.
    #[serde(default)]
    pub deactivated: Vec<Did>,
}

#[derive(Debug, Clone)]
enum DocumentEntry {
    Live(DidDocument),
    Deactivated,
}

/// Ledger client backed by in-process maps.
///
/// Serves nodes running without a ledger endpoint and the test suites.
pub struct InMemoryLedger {
    /// Name → DID.
    names: DashMap<String, Did>,
    /// DID URI → document state.
    documents: DashMap<String, DocumentEntry>,
    connected: AtomicBool,
}

impl InMemoryLedger {
    /// Create a new, empty ledger.
    pub fn new() -> Self {
        Self {
            names: DashMap::new(),
            documents: DashMap::new(),
            connected: AtomicBool::new(false),
        }
    }

    /// Build a ledger from a snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, IdentityError> {
        let ledger = Self::new();
        for (name, did) in snapshot.names {
            ledger.bind_name(&Web3Name::new(&name)?, did)?;
        }
        for document in snapshot.documents {
            ledger.register_document(document)?;
        }
        for did in snapshot.deactivated {
            if !ledger.documents.contains_key(did.uri()) {
                ledger
                    .documents
                    .insert(did.uri().to_string(), DocumentEntry::Deactivated);
            } else {
                ledger.deactivate(&did)?;
            }
        }
        Ok(ledger)
    }

    /// Load a JSON snapshot file.
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IdentityError::Serialization(format!("reading {}: {}", path.display(), e))
        })?;
        let snapshot: LedgerSnapshot = serde_json::from_str(&contents)
            .map_err(|e| IdentityError::Serialization(format!("{}: {}", path.display(), e)))?;
        let ledger = Self::from_snapshot(snapshot)?;
        tracing::info!(
            path = %path.display(),
            names = ledger.names.len(),
            documents = ledger.documents.len(),
            "ledger snapshot loaded"
        );
        Ok(ledger)
    }

    /// Bind a name to a DID. A name can only be bound once.
    pub fn bind_name(&self, name: &Web3Name, did: Did) -> Result<(), IdentityError> {
        if self.names.contains_key(name.as_str()) {
            return Err(IdentityError::Duplicate(format!("name {}", name)));
        }
        self.names.insert(name.as_str().to_string(), did);
        Ok(())
    }

    /// Store a live document; replaces any previous live document for the DID.
    pub fn register_document(&self, document: DidDocument) -> Result<(), IdentityError> {
        let key = document.id.uri().to_string();
        if let Some(entry) = self.documents.get(&key) {
            if matches!(*entry, DocumentEntry::Deactivated) {
                return Err(IdentityError::Deactivated(key.clone()));
            }
        }
        self.documents.insert(key, DocumentEntry::Live(document));
        Ok(())
    }

    /// Deactivate a registered DID. Its document body is discarded.
    pub fn deactivate(&self, did: &Did) -> Result<(), IdentityError> {
        let mut entry = self
            .documents
            .get_mut(did.uri())
            .ok_or_else(|| IdentityError::NotFound(did.to_string()))?;
        *entry = DocumentEntry::Deactivated;
        tracing::debug!(did = %did, "DID deactivated");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn ensure_connected(&self) -> Result<(), IdentityError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(IdentityError::Upstream("in-memory ledger not connected".into()))
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn connect(&self, address: &str) -> Result<(), IdentityError> {
        tracing::debug!(address = address, "in-memory ledger connect");
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), IdentityError> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    async fn query_did_for_name(&self, name: &Web3Name) -> Result<Option<Did>, IdentityError> {
        self.ensure_connected()?;
        Ok(self.names.get(name.as_str()).map(|entry| entry.clone()))
    }

    async fn resolve_document(&self, did: &Did) -> Result<DocumentResolution, IdentityError> {
        self.ensure_connected()?;
        let resolution = match self.documents.get(did.uri()).map(|e| e.clone()) {
            Some(DocumentEntry::Live(document)) => DocumentResolution::active(document),
            Some(DocumentEntry::Deactivated) => DocumentResolution::deactivated(),
            None => DocumentResolution::unknown(),
        };
        Ok(resolution)
    }
}
