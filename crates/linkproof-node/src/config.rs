//! Node configuration loading and management.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use linkproof_core::{SchemaId, TrustedAttesters, UsernameMatch, VerificationConfig};
use linkproof_credentials::{PlatformDescriptor, SchemaRegistry};

/// Full configuration for the Linkproof node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinkproofConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Identity ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Credential collection download settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Trust and matching settings.
    #[serde(default)]
    pub verification: VerificationSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger endpoint handed to `LedgerHandle::init`.
    #[serde(default = "default_ledger_address")]
    pub address: String,
    /// JSON snapshot seeding the in-memory ledger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout for collection downloads.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// HTTP gateway for `ipfs://` endpoints.
    #[serde(default = "default_ipfs_gateway")]
    pub ipfs_gateway: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerificationSection {
    /// Attesters trusted for every platform without an override.
    #[serde(default)]
    pub trusted_attesters: TrustedAttesters,
    /// Username comparison policy (exact, case_insensitive).
    #[serde(default)]
    pub username_match: UsernameMatch,
    /// Replaces the built-in platform table when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<PlatformEntry>,
    /// Public keys of attesters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attester_keys: Vec<AttesterKey>,
    /// Digests of revoked credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revoked_credentials: Vec<String>,
}

/// One row of a platform table override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub name: String,
    pub title: String,
    pub contents_key: String,
    pub link_template: String,
    /// Explicit schema id; derived from title and contents key when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_attesters: Option<TrustedAttesters>,
}

impl PlatformEntry {
    fn to_descriptor(&self) -> PlatformDescriptor {
        let mut descriptor = PlatformDescriptor::new(
            &self.name,
            &self.title,
            &self.contents_key,
            &self.link_template,
        );
        if let Some(ref id) = self.schema_id {
            descriptor.schema_id = SchemaId::new(id.clone());
        }
        descriptor.trusted_attesters = self.trusted_attesters.clone();
        descriptor
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttesterKey {
    /// Attester DID.
    pub attester: String,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9101
}
fn default_ledger_address() -> String {
    "memory://local".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_ipfs_gateway() -> String {
    linkproof_credentials::fetcher::DEFAULT_IPFS_GATEWAY.into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            address: default_ledger_address(),
            snapshot_path: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            ipfs_gateway: default_ipfs_gateway(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LinkproofConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: LinkproofConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject configurations the node cannot start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.verification_config().validate()?;
        self.registry()?;
        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch.timeout_secs must be positive");
        }
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("unknown logging.format '{}'", other),
        }
        Ok(())
    }

    /// Settings consumed by the profile verifier.
    pub fn verification_config(&self) -> VerificationConfig {
        VerificationConfig {
            trusted_attesters: self.verification.trusted_attesters.clone(),
            username_match: self.verification.username_match,
        }
    }

    /// The platform table: the configured override, or the built-in one.
    pub fn registry(&self) -> anyhow::Result<SchemaRegistry> {
        if self.verification.platforms.is_empty() {
            return Ok(SchemaRegistry::builtin());
        }
        let descriptors = self
            .verification
            .platforms
            .iter()
            .map(PlatformEntry::to_descriptor)
            .collect();
        Ok(SchemaRegistry::from_descriptors(descriptors)?)
    }

    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}
