//! Module identity records as kept by the Hub's registry.

use std::fmt;
use std::hash::{Hash, Hasher};

/// `connectionState` value of a module with a live connection.
pub const CONNECTED: &str = "Connected";

/// A module registered under a device.
///
/// Management clients create it with the identity and authentication groups
/// filled in; the Hub assigns operational metadata and versioning on write.
/// Timestamps are kept exactly as the Hub formats them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleIdentity {
    pub module_id: String,
    pub device_id: String,
    pub authentication: Authentication,
    /// Owner of the module, e.g. `IotEdge` for modules of the edge runtime.
    pub managed_by: String,
    pub last_activity_time: String,
    /// Cloud-to-module messages currently queued for the module.
    pub cloud_to_device_message_count: u64,
    pub connection_state: String,
    pub connection_state_updated_time: String,
    /// Weak entity tag (RFC 7232) of the stored record.
    pub etag: String,
    /// Distinguishes re-created modules that reuse a `module_id`.
    pub generation_id: String,
}

impl ModuleIdentity {
    pub fn new(device_id: impl Into<String>, module_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            module_id: module_id.into(),
            ..Self::default()
        }
    }

    /// Authenticate with a pair of base64 symmetric keys.
    #[must_use]
    pub fn with_symmetric_key(
        mut self,
        primary_key: impl Into<String>,
        secondary_key: impl Into<String>,
    ) -> Self {
        self.authentication.kind = AuthenticationType::Sas;
        self.authentication.symmetric_key = SymmetricKey {
            primary_key: primary_key.into(),
            secondary_key: secondary_key.into(),
        };
        self
    }

    /// Authenticate with a pair of self-signed certificate thumbprints.
    #[must_use]
    pub fn with_x509_thumbprint(
        mut self,
        primary_thumbprint: impl Into<String>,
        secondary_thumbprint: impl Into<String>,
    ) -> Self {
        self.authentication.kind = AuthenticationType::SelfSigned;
        self.authentication.x509_thumbprint = X509Thumbprint {
            primary_thumbprint: primary_thumbprint.into(),
            secondary_thumbprint: secondary_thumbprint.into(),
        };
        self
    }

    /// Registry key: (`device_id`, `module_id`).
    pub fn key(&self) -> (&str, &str) {
        (&self.device_id, &self.module_id)
    }

    /// Entity tag to send with an upsert. `None` means an unconditional create.
    pub fn if_match(&self) -> Option<&str> {
        (!self.etag.is_empty()).then_some(self.etag.as_str())
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state == CONNECTED
    }
}

/// Credentials a module presents to the Hub.
///
/// Both credential groups are always present on the wire; which one is in
/// force is decided by `kind`. See [`Authentication::credential`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    pub kind: AuthenticationType,
    pub symmetric_key: SymmetricKey,
    pub x509_thumbprint: X509Thumbprint,
}

impl Authentication {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The credential selected by `kind`.
    pub fn credential(&self) -> Credential<'_> {
        match AuthenticationType::from(self.kind.as_str()) {
            AuthenticationType::Sas => Credential::SymmetricKey(&self.symmetric_key),
            AuthenticationType::SelfSigned => Credential::X509Thumbprint(&self.x509_thumbprint),
            AuthenticationType::CertificateAuthority => Credential::CertificateAuthority,
            AuthenticationType::None => Credential::None,
            AuthenticationType::Unspecified | AuthenticationType::Other(_) => {
                Credential::Unknown(self.kind.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymmetricKey {
    pub primary_key: String,
    pub secondary_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct X509Thumbprint {
    pub primary_thumbprint: String,
    pub secondary_thumbprint: String,
}

/// Authentication scheme tag.
///
/// Equality and hashing follow the wire tag, so `Other("sas")` equals `Sas`
/// and `Other("")` equals `Unspecified`.
#[derive(Debug, Clone, Default)]
pub enum AuthenticationType {
    /// Empty tag.
    #[default]
    Unspecified,
    Sas,
    SelfSigned,
    CertificateAuthority,
    None,
    Other(String),
}

impl AuthenticationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unspecified => "",
            Self::Sas => "sas",
            Self::SelfSigned => "selfSigned",
            Self::CertificateAuthority => "certificateAuthority",
            Self::None => "none",
            Self::Other(tag) => tag,
        }
    }
}

impl PartialEq for AuthenticationType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for AuthenticationType {}

impl Hash for AuthenticationType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for AuthenticationType {
    fn from(tag: &str) -> Self {
        match tag {
            "" => Self::Unspecified,
            "sas" => Self::Sas,
            "selfSigned" => Self::SelfSigned,
            "certificateAuthority" => Self::CertificateAuthority,
            "none" => Self::None,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of the credential in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    SymmetricKey(&'a SymmetricKey),
    X509Thumbprint(&'a X509Thumbprint),
    /// Certificate chained to a registered authority; no per-module secret.
    CertificateAuthority,
    None,
    /// Tag this crate does not know, kept verbatim.
    Unknown(&'a str),
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn authentication_tags_round_trip() {
        for tag in ["", "sas", "selfSigned", "certificateAuthority", "none", "tpm"] {
            assert_eq!(AuthenticationType::from(tag).as_str(), tag);
        }
        assert_eq!(
            AuthenticationType::from("tpm"),
            AuthenticationType::Other("tpm".into())
        );
    }

    #[test]
    fn other_with_known_tag_equals_known_variant() {
        use std::collections::HashSet;

        assert_eq!(AuthenticationType::Other("sas".into()), AuthenticationType::Sas);
        assert_eq!(
            AuthenticationType::Other(String::new()),
            AuthenticationType::Unspecified
        );
        assert_ne!(AuthenticationType::Other("tpm".into()), AuthenticationType::Sas);

        let tags: HashSet<_> = [
            AuthenticationType::Other("none".into()),
            AuthenticationType::None,
        ]
        .into_iter()
        .collect();
        assert_eq!(tags.len(), 1);

        let auth = Authentication {
            kind: AuthenticationType::Other(String::new()),
            ..Authentication::default()
        };
        assert!(auth.is_empty());
    }

    #[test]
    fn credential_follows_kind() {
        let identity = ModuleIdentity::new("d", "m").with_symmetric_key("AAA=", "BBB=");
        match identity.authentication.credential() {
            Credential::SymmetricKey(key) => assert_eq!(key.primary_key, "AAA="),
            other => panic!("unexpected credential {other:?}"),
        }

        let identity = ModuleIdentity::new("d", "m").with_x509_thumbprint("AB12", "CD34");
        assert!(matches!(
            identity.authentication.credential(),
            Credential::X509Thumbprint(t) if t.secondary_thumbprint == "CD34"
        ));

        let auth = Authentication {
            kind: "future".into(),
            ..Authentication::default()
        };
        assert_eq!(auth.credential(), Credential::Unknown("future"));

        let auth = Authentication {
            kind: AuthenticationType::Other("sas".into()),
            ..Authentication::default()
        };
        assert!(matches!(auth.credential(), Credential::SymmetricKey(_)));
    }

    #[test]
    fn if_match_requires_etag() {
        let mut identity = ModuleIdentity::new("d", "m");
        assert_eq!(identity.if_match(), None);
        identity.etag = "W/\"abc\"".into();
        assert_eq!(identity.if_match(), Some("W/\"abc\""));
    }

    #[test]
    fn key_is_device_then_module() {
        let identity = ModuleIdentity::new("dev", "mod");
        assert_eq!(identity.key(), ("dev", "mod"));
    }

    #[test]
    fn connection_state_check() {
        let mut identity = ModuleIdentity::default();
        assert!(!identity.is_connected());
        identity.connection_state = CONNECTED.into();
        assert!(identity.is_connected());
    }

    #[test]
    fn default_authentication_is_empty() {
        assert!(Authentication::default().is_empty());
        assert!(
            !ModuleIdentity::new("d", "m")
                .with_symmetric_key("", "")
                .authentication
                .is_empty()
        );
    }
}
