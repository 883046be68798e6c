use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use linkproof_core::{Did, Web3Name};

use crate::document::DidDocument;
use crate::error::IdentityError;

/// Outcome of resolving a DID on the ledger.
///
/// `document: None, deactivated: false` means the DID was never registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResolution {
    pub document: Option<DidDocument>,
    pub deactivated: bool,
}

impl DocumentResolution {
    pub fn active(document: DidDocument) -> Self {
        Self {
            document: Some(document),
            deactivated: false,
        }
    }

    pub fn deactivated() -> Self {
        Self {
            document: None,
            deactivated: true,
        }
    }

    pub fn unknown() -> Self {
        Self {
            document: None,
            deactivated: false,
        }
    }
}

/// Client for the ledger that stores name bindings and DID documents.
///
/// Errors returned by implementations describe operational failures
/// (network, protocol); "no binding" is expressed through the `Option` and
/// `DocumentResolution` return values instead.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Open the connection to the ledger node at `address`.
    async fn connect(&self, address: &str) -> Result<(), IdentityError>;

    /// Close the connection.
    async fn disconnect(&self) -> Result<(), IdentityError>;

    /// Look up the DID currently bound to `name`.
    async fn query_did_for_name(&self, name: &Web3Name) -> Result<Option<Did>, IdentityError>;

    /// Resolve a DID to its current document.
    async fn resolve_document(&self, did: &Did) -> Result<DocumentResolution, IdentityError>;
}

const STATE_IDLE: u8 = 0;
const STATE_CONNECTED: u8 = 1;
const STATE_SHUT_DOWN: u8 = 2;

/// Process-wide handle to the ledger connection.
///
/// The host calls [`LedgerHandle::init`] once before serving requests and
/// [`LedgerHandle::shutdown`] once at exit; queries outside that window fail
/// with [`IdentityError::Upstream`].
pub struct LedgerHandle {
    client: Arc<dyn LedgerClient>,
    state: AtomicU8,
}

impl LedgerHandle {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            client,
            state: AtomicU8::new(STATE_IDLE),
        }
    }

    /// Connect to the ledger. Fails if the handle was already initialised.
    pub async fn init(&self, address: &str) -> Result<(), IdentityError> {
        if self.state.load(Ordering::Acquire) != STATE_IDLE {
            return Err(IdentityError::Lifecycle(
                "ledger handle already initialised".into(),
            ));
        }
        self.client.connect(address).await?;
        self.state
            .compare_exchange(
                STATE_IDLE,
                STATE_CONNECTED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| IdentityError::Lifecycle("concurrent ledger init".into()))?;
        tracing::info!(address = address, "ledger connected");
        Ok(())
    }

    /// Disconnect from the ledger. Only the first call after `init` has an
    /// effect; later calls are no-ops.
    pub async fn shutdown(&self) -> Result<(), IdentityError> {
        let previous = self.state.swap(STATE_SHUT_DOWN, Ordering::AcqRel);
        if previous != STATE_CONNECTED {
            return Ok(());
        }
        self.client.disconnect().await?;
        tracing::info!("ledger disconnected");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_CONNECTED
    }

    fn ensure_connected(&self) -> Result<(), IdentityError> {
        match self.state.load(Ordering::Acquire) {
            STATE_CONNECTED => Ok(()),
            STATE_SHUT_DOWN => Err(IdentityError::Upstream("ledger handle shut down".into())),
            _ => Err(IdentityError::Upstream("ledger handle not initialised".into())),
        }
    }

    pub async fn query_did_for_name(&self, name: &Web3Name) -> Result<Option<Did>, IdentityError> {
        self.ensure_connected()?;
        self.client.query_did_for_name(name).await
    }

    pub async fn resolve_document(&self, did: &Did) -> Result<DocumentResolution, IdentityError> {
        self.ensure_connected()?;
        self.client.resolve_document(did).await
    }
}
