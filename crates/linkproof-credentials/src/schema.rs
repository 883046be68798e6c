use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use linkproof_core::{SchemaId, TrustedAttesters};
use linkproof_crypto::hash_hex;

use crate::error::CredentialError;

/// Placeholder substituted by [`PlatformDescriptor::render_link`].
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Bytes escaped in a substituted username: URL delimiters that would move
/// the value out of its segment, plus `%` and characters unsafe in a path.
const USERNAME_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A supported platform and the credential schema that proves an account on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Platform key used in requests and profiles (lower-case, e.g. "twitter").
    pub name: String,
    /// Display title (e.g. "Twitter").
    pub title: String,
    /// Schema identifier classifying credentials for this platform.
    pub schema_id: SchemaId,
    /// Claim field holding the platform username.
    pub contents_key: String,
    /// Profile URL template containing `{username}`.
    pub link_template: String,
    /// Attesters trusted for this platform; falls back to the global list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_attesters: Option<TrustedAttesters>,
}

impl PlatformDescriptor {
    /// Build a descriptor whose schema id is derived from its shape.
    pub fn new(name: &str, title: &str, contents_key: &str, link_template: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            title: title.to_string(),
            schema_id: Self::derive_schema_id(title, contents_key),
            contents_key: contents_key.to_string(),
            link_template: link_template.to_string(),
            trusted_attesters: None,
        }
    }

    /// Schema id as the BLAKE3 hash of the canonical `{title, contentsKey}` JSON.
    pub fn derive_schema_id(title: &str, contents_key: &str) -> SchemaId {
        let canonical = serde_json::json!({
            "contentsKey": contents_key,
            "title": title,
        });
        SchemaId::new(hash_hex(canonical.to_string().as_bytes()))
    }

    /// Render the profile URL for `username`.
    ///
    /// The username is percent-encoded so it stays a single path segment;
    /// `@`, `.`, `-`, `_`, `+` and `~` pass through unchanged.
    pub fn render_link(&self, username: &str) -> String {
        let encoded = utf8_percent_encode(username, USERNAME_ESCAPES).to_string();
        self.link_template.replace(USERNAME_PLACEHOLDER, &encoded)
    }

    /// Attesters to check credentials of this platform against.
    pub fn attesters<'a>(&'a self, global: &'a TrustedAttesters) -> &'a TrustedAttesters {
        self.trusted_attesters.as_ref().unwrap_or(global)
    }
}

/// Immutable registry of supported platforms, indexed by schema id and name.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    descriptors: Vec<PlatformDescriptor>,
    by_schema: HashMap<SchemaId, usize>,
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Validate and index a descriptor table.
    ///
    /// Duplicate schema ids or platform names, empty contents keys, and
    /// templates without `{username}` are rejected.
    pub fn from_descriptors(descriptors: Vec<PlatformDescriptor>) -> Result<Self, CredentialError> {
        if descriptors.is_empty() {
            return Err(CredentialError::InvalidRegistry(
                "at least one platform is required".into(),
            ));
        }

        let mut by_schema = HashMap::with_capacity(descriptors.len());
        let mut by_name = HashMap::with_capacity(descriptors.len());

        for (idx, descriptor) in descriptors.iter().enumerate() {
            if descriptor.name.is_empty() || descriptor.name != descriptor.name.to_lowercase() {
                return Err(CredentialError::InvalidRegistry(format!(
                    "platform name must be non-empty lower-case, got '{}'",
                    descriptor.name
                )));
            }
            if descriptor.contents_key.is_empty() {
                return Err(CredentialError::InvalidRegistry(format!(
                    "platform {} has an empty contents key",
                    descriptor.name
                )));
            }
            if !descriptor.link_template.contains(USERNAME_PLACEHOLDER) {
                return Err(CredentialError::InvalidRegistry(format!(
                    "link template for {} lacks {}",
                    descriptor.name, USERNAME_PLACEHOLDER
                )));
            }
            if by_schema.insert(descriptor.schema_id.clone(), idx).is_some() {
                return Err(CredentialError::InvalidRegistry(format!(
                    "duplicate schema id {}",
                    descriptor.schema_id
                )));
            }
            if by_name.insert(descriptor.name.clone(), idx).is_some() {
                return Err(CredentialError::InvalidRegistry(format!(
                    "duplicate platform name {}",
                    descriptor.name
                )));
            }
        }

        Ok(Self {
            descriptors,
            by_schema,
            by_name,
        })
    }

    /// The bundled platform table.
    pub fn builtin() -> Self {
        let descriptors = vec![
            PlatformDescriptor::new("twitter", "Twitter", "Twitter", "https://twitter.com/{username}"),
            PlatformDescriptor::new("github", "GitHub", "Username", "https://github.com/{username}"),
            PlatformDescriptor::new("discord", "Discord", "User ID", "https://discord.com/users/{username}"),
            PlatformDescriptor::new("twitch", "Twitch", "Username", "https://www.twitch.tv/{username}"),
            PlatformDescriptor::new("telegram", "Telegram", "Username", "https://t.me/{username}"),
            PlatformDescriptor::new(
                "youtube",
                "YouTube",
                "Channel ID",
                "https://www.youtube.com/channel/{username}",
            ),
            PlatformDescriptor::new("email", "Email", "Email", "mailto:{username}"),
        ];
        let by_schema = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.schema_id.clone(), i))
            .collect();
        let by_name = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self {
            descriptors,
            by_schema,
            by_name,
        }
    }

    pub fn find_by_schema_id(&self, id: &SchemaId) -> Option<&PlatformDescriptor> {
        self.by_schema.get(id).map(|&i| &self.descriptors[i])
    }

    /// Look up a platform by name, ignoring case.
    pub fn find_by_platform(&self, name: &str) -> Option<&PlatformDescriptor> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.descriptors[i])
    }

    pub fn all(&self) -> impl Iterator<Item = &PlatformDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
