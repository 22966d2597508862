//! JSON codec for [`ModuleIdentity`].
//!
//! Keys are lower camel case. The authentication record keeps the Hub's
//! canonical shape: once present, `type` and both credential sub-objects
//! are always written.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use super::types::{Authentication, ModuleIdentity, SymmetricKey, X509Thumbprint};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::wire::{self, Fields, ObjectWriter};

pub const MODULE_ID: &str = "moduleId";
pub const DEVICE_ID: &str = "deviceId";
pub const AUTHENTICATION: &str = "authentication";
pub const MANAGED_BY: &str = "managedBy";
pub const LAST_ACTIVITY_TIME: &str = "lastActivityTime";
pub const CLOUD_TO_DEVICE_MESSAGE_COUNT: &str = "cloudToDeviceMessageCount";
pub const CONNECTION_STATE: &str = "connectionState";
pub const CONNECTION_STATE_UPDATED_TIME: &str = "connectionStateUpdatedTime";
pub const ETAG: &str = "etag";
pub const GENERATION_ID: &str = "generationId";

const KNOWN_FIELDS: &[&str] = &[
    MODULE_ID,
    DEVICE_ID,
    AUTHENTICATION,
    MANAGED_BY,
    LAST_ACTIVITY_TIME,
    CLOUD_TO_DEVICE_MESSAGE_COUNT,
    CONNECTION_STATE,
    CONNECTION_STATE_UPDATED_TIME,
    ETAG,
    GENERATION_ID,
];

const AUTH_FIELDS: &[&str] = &["type", "symmetricKey", "x509Thumbprint"];
const SYMMETRIC_KEY_FIELDS: &[&str] = &["primaryKey", "secondaryKey"];
const THUMBPRINT_FIELDS: &[&str] = &["primaryThumbprint", "secondaryThumbprint"];

/// Encode a module identity as compact JSON.
pub fn encode(identity: &ModuleIdentity) -> Vec<u8> {
    encode_with(identity, &CodecConfig::default())
}

/// Encode a module identity using `config`.
pub fn encode_with(identity: &ModuleIdentity, config: &CodecConfig) -> Vec<u8> {
    let out = wire::render(&to_value(identity), config.pretty);
    tracing::trace!(
        device_id = %identity.device_id,
        module_id = %identity.module_id,
        bytes = out.len(),
        "Encoded module identity"
    );
    out
}

/// Decode a module identity from JSON bytes.
pub fn decode(input: &[u8]) -> Result<ModuleIdentity> {
    decode_with(input, &CodecConfig::default())
}

/// Decode a module identity using `config`.
pub fn decode_with(input: &[u8], config: &CodecConfig) -> Result<ModuleIdentity> {
    let raw = wire::parse(input)?;
    from_value(&raw, config)
}

/// Build the JSON object for a module identity.
pub fn to_value(identity: &ModuleIdentity) -> Value {
    let auth = &identity.authentication;
    ObjectWriter::new()
        .string(MODULE_ID, &identity.module_id)
        .string(DEVICE_ID, &identity.device_id)
        .object(
            AUTHENTICATION,
            (!auth.is_empty()).then(|| authentication_value(auth)),
        )
        .string(MANAGED_BY, &identity.managed_by)
        .string(LAST_ACTIVITY_TIME, &identity.last_activity_time)
        .always(
            CLOUD_TO_DEVICE_MESSAGE_COUNT,
            identity.cloud_to_device_message_count,
        )
        .string(CONNECTION_STATE, &identity.connection_state)
        .string(
            CONNECTION_STATE_UPDATED_TIME,
            &identity.connection_state_updated_time,
        )
        .string(ETAG, &identity.etag)
        .string(GENERATION_ID, &identity.generation_id)
        .finish()
}

/// Read a module identity out of an already parsed JSON value.
pub fn from_value(raw: &Value, config: &CodecConfig) -> Result<ModuleIdentity> {
    let fields = Fields::root(raw)?;
    let log = config.log_unknown_fields;
    if log {
        fields.skip_unknown(KNOWN_FIELDS, "ModuleIdentity");
    }

    let authentication = match fields.object(AUTHENTICATION)? {
        Some(auth) => read_authentication(&auth, log)?,
        None => Authentication::default(),
    };

    Ok(ModuleIdentity {
        module_id: fields.string(MODULE_ID)?,
        device_id: fields.string(DEVICE_ID)?,
        authentication,
        managed_by: fields.string(MANAGED_BY)?,
        last_activity_time: fields.string(LAST_ACTIVITY_TIME)?,
        cloud_to_device_message_count: fields.count(CLOUD_TO_DEVICE_MESSAGE_COUNT)?,
        connection_state: fields.string(CONNECTION_STATE)?,
        connection_state_updated_time: fields.string(CONNECTION_STATE_UPDATED_TIME)?,
        etag: fields.string(ETAG)?,
        generation_id: fields.string(GENERATION_ID)?,
    })
}

fn authentication_value(auth: &Authentication) -> Value {
    json!({
        "type": auth.kind.as_str(),
        "symmetricKey": {
            "primaryKey": auth.symmetric_key.primary_key,
            "secondaryKey": auth.symmetric_key.secondary_key,
        },
        "x509Thumbprint": {
            "primaryThumbprint": auth.x509_thumbprint.primary_thumbprint,
            "secondaryThumbprint": auth.x509_thumbprint.secondary_thumbprint,
        },
    })
}

fn read_authentication(auth: &Fields<'_>, log: bool) -> Result<Authentication> {
    if log {
        auth.skip_unknown(AUTH_FIELDS, "Authentication");
    }

    let symmetric_key = match auth.object("symmetricKey")? {
        Some(key) => {
            if log {
                key.skip_unknown(SYMMETRIC_KEY_FIELDS, "SymmetricKey");
            }
            SymmetricKey {
                primary_key: key.string("primaryKey")?,
                secondary_key: key.string("secondaryKey")?,
            }
        }
        None => SymmetricKey::default(),
    };

    let x509_thumbprint = match auth.object("x509Thumbprint")? {
        Some(thumb) => {
            if log {
                thumb.skip_unknown(THUMBPRINT_FIELDS, "X509Thumbprint");
            }
            X509Thumbprint {
                primary_thumbprint: thumb.string("primaryThumbprint")?,
                secondary_thumbprint: thumb.string("secondaryThumbprint")?,
            }
        }
        None => X509Thumbprint::default(),
    };

    Ok(Authentication {
        kind: auth.string("type")?.as_str().into(),
        symmetric_key,
        x509_thumbprint,
    })
}

impl Serialize for ModuleIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModuleIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        from_value(&raw, &CodecConfig::default()).map_err(D::Error::custom)
    }
}
