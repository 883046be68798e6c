//! Credential collection discovery and retrieval.
//!
//! A DID document advertises where its published credentials live through a
//! service endpoint of type [`PUBLISHED_CREDENTIALS_SERVICE`]. The fetcher
//! picks that endpoint, downloads the collection, and validates its shape
//! before anything downstream sees it.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use linkproof_identity::{DidDocument, ServiceEndpoint};

use crate::envelope::CredentialEnvelope;
use crate::error::CredentialError;

/// Service type tag of credential-collection endpoints.
pub const PUBLISHED_CREDENTIALS_SERVICE: &str = "PublishedCredentialCollectionV1";

/// Default gateway for `ipfs://` endpoints.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs";

/// Raw response from a [`CredentialTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves externally hosted documents.
///
/// Non-2xx statuses are returned as responses, not errors; errors mean the
/// request could not complete.
#[async_trait]
pub trait CredentialTransport: Send + Sync {
    async fn get(&self, uri: &str) -> Result<TransportResponse, CredentialError>;
}

/// HTTP transport over `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, CredentialError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("linkproof/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CredentialError::Upstream(format!("building HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CredentialTransport for HttpTransport {
    async fn get(&self, uri: &str) -> Result<TransportResponse, CredentialError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| CredentialError::Upstream(format!("GET {}: {}", uri, e)))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CredentialError::Upstream(format!("reading body of {}: {}", uri, e)))?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Locates and downloads published credential collections.
#[derive(Clone)]
pub struct CredentialFetcher {
    transport: Arc<dyn CredentialTransport>,
    ipfs_gateway: String,
}

impl CredentialFetcher {
    pub fn new(transport: Arc<dyn CredentialTransport>) -> Self {
        Self {
            transport,
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
        }
    }

    /// Use a different gateway for `ipfs://` URIs.
    pub fn with_ipfs_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.ipfs_gateway = gateway.into().trim_end_matches('/').to_string();
        self
    }

    /// The single credential-collection endpoint of `document`.
    ///
    /// More than one candidate is rejected rather than guessing which is
    /// authoritative.
    pub fn locate_endpoint<'a>(
        &self,
        document: &'a DidDocument,
    ) -> Result<&'a ServiceEndpoint, CredentialError> {
        let mut candidates = document.services_of_type(PUBLISHED_CREDENTIALS_SERVICE);
        let endpoint = candidates.next().ok_or_else(|| {
            CredentialError::NotFound(format!(
                "{} exposes no {} endpoint",
                document.id, PUBLISHED_CREDENTIALS_SERVICE
            ))
        })?;
        let extra = candidates.count();
        if extra > 0 {
            return Err(CredentialError::Conflict(format!(
                "{} exposes {} {} endpoints",
                document.id,
                extra + 1,
                PUBLISHED_CREDENTIALS_SERVICE
            )));
        }
        if endpoint.uris.is_empty() {
            return Err(CredentialError::NotFound(format!(
                "endpoint {} has no URIs",
                endpoint.id
            )));
        }
        Ok(endpoint)
    }

    /// Fetch the collection published at the endpoint's first URI.
    pub async fn fetch_endpoint(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<Vec<CredentialEnvelope>, CredentialError> {
        let uri = endpoint.uris.first().ok_or_else(|| {
            CredentialError::NotFound(format!("endpoint {} has no URIs", endpoint.id))
        })?;
        self.fetch(uri).await
    }

    /// Download and validate the credential collection at `uri`.
    pub async fn fetch(&self, uri: &str) -> Result<Vec<CredentialEnvelope>, CredentialError> {
        let url = self.resolve_uri(uri)?;
        tracing::debug!(uri = uri, url = %url, "fetching credential collection");

        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            return Err(CredentialError::Upstream(format!(
                "GET {} returned status {}",
                url, response.status
            )));
        }

        let collection = parse_collection(&response.body)?;
        tracing::debug!(uri = uri, count = collection.len(), "credential collection fetched");
        Ok(collection)
    }

    /// Map an endpoint URI to a fetchable URL.
    pub fn resolve_uri(&self, uri: &str) -> Result<String, CredentialError> {
        if let Some(path) = uri.strip_prefix("ipfs://") {
            if path.is_empty() {
                return Err(CredentialError::MalformedData("empty ipfs:// URI".into()));
            }
            return Ok(format!("{}/{}", self.ipfs_gateway, path));
        }
        if uri.starts_with("https://") || uri.starts_with("http://") {
            return Ok(uri.to_string());
        }
        Err(CredentialError::MalformedData(format!(
            "unsupported endpoint URI scheme: {}",
            uri
        )))
    }
}

/// Validate a fetched body as a non-empty array of credential envelopes.
///
/// Every element must be an object carrying `schemaId`, a `contents` object,
/// and a `proof` object; the first offending element fails the whole
/// collection.
pub fn parse_collection(body: &[u8]) -> Result<Vec<CredentialEnvelope>, CredentialError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| CredentialError::MalformedData(format!("body is not JSON: {}", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| CredentialError::MalformedData("collection must be a JSON array".into()))?;
    if items.is_empty() {
        return Err(CredentialError::MalformedData("collection is empty".into()));
    }

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_envelope(idx, item))
        .collect()
}

fn parse_envelope(idx: usize, item: &serde_json::Value) -> Result<CredentialEnvelope, CredentialError> {
    let object = item.as_object().ok_or_else(|| {
        CredentialError::MalformedData(format!("credential {} is not an object", idx))
    })?;

    let checks: [(&str, fn(&serde_json::Value) -> bool); 3] = [
        ("schemaId", serde_json::Value::is_string),
        ("contents", serde_json::Value::is_object),
        ("proof", serde_json::Value::is_object),
    ];
    for (field, has_shape) in checks {
        match object.get(field) {
            Some(v) if has_shape(v) => {}
            Some(_) => {
                return Err(CredentialError::MalformedData(format!(
                    "credential {}: field {} has the wrong type",
                    idx, field
                )))
            }
            None => {
                return Err(CredentialError::MalformedData(format!(
                    "credential {}: missing {}",
                    idx, field
                )))
            }
        }
    }

    serde_json::from_value(item.clone())
        .map_err(|e| CredentialError::MalformedData(format!("credential {}: {}", idx, e)))
}
