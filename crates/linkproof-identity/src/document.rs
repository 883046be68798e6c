use linkproof_core::Did;
use serde::{Deserialize, Serialize};

/// A service endpoint in a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Service identifier (e.g., "did:kilt:4abc#linked-credentials").
    pub id: String,
    /// Service type tags (e.g., ["PublishedCredentialCollectionV1"]).
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Endpoint URIs, in the order the controller published them.
    #[serde(rename = "serviceEndpoint")]
    pub uris: Vec<String>,
}

impl ServiceEndpoint {
    pub fn new(id: impl Into<String>, service_type: &str, uri: &str) -> Self {
        Self {
            id: id.into(),
            types: vec![service_type.to_string()],
            uris: vec![uri.to_string()],
        }
    }

    /// Whether this endpoint carries the given type tag.
    pub fn has_type(&self, service_type: &str) -> bool {
        self.types.iter().any(|t| t == service_type)
    }
}

/// The resolved, live state of a DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// The DID subject.
    pub id: Did,
    /// Service endpoints.
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceEndpoint>,
}

impl DidDocument {
    /// Create a document without any services.
    pub fn new(id: Did) -> Self {
        Self {
            id,
            services: Vec::new(),
        }
    }

    /// Add a service endpoint with a single type and URI; the service id is
    /// derived from the DID.
    pub fn add_service(&mut self, fragment: &str, service_type: &str, uri: &str) {
        let id = format!("{}#{}", self.id, fragment);
        self.services.push(ServiceEndpoint::new(id, service_type, uri));
    }

    /// Builder form of [`DidDocument::add_service`].
    pub fn with_service(mut self, fragment: &str, service_type: &str, uri: &str) -> Self {
        self.add_service(fragment, service_type, uri);
        self
    }

    /// Services carrying the given type tag.
    pub fn services_of_type<'a>(
        &'a self,
        service_type: &'a str,
    ) -> impl Iterator<Item = &'a ServiceEndpoint> + 'a {
        self.services.iter().filter(move |s| s.has_type(service_type))
    }
}
