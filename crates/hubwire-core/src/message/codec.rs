//! JSON codec for [`Message`].
//!
//! Zero-valued fields are omitted on encode; transport options are never
//! written and never read.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use super::types::{ConnectionAuthMethod, Message};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::wire::{self, Fields, ObjectWriter};

pub const MESSAGE_ID: &str = "MessageId";
pub const TO: &str = "To";
pub const EXPIRY_TIME: &str = "ExpiryTimeUtc";
pub const ENQUEUED_TIME: &str = "EnqueuedTime";
pub const CORRELATION_ID: &str = "CorrelationId";
pub const USER_ID: &str = "UserId";
pub const CONNECTION_DEVICE_ID: &str = "ConnectionDeviceId";
pub const CONNECTION_DEVICE_GENERATION_ID: &str = "ConnectionDeviceGenerationId";
pub const CONNECTION_AUTH_METHOD: &str = "ConnectionAuthMethod";
pub const MESSAGE_SOURCE: &str = "MessageSource";
pub const PAYLOAD: &str = "Payload";
pub const PROPERTIES: &str = "Properties";

const KNOWN_FIELDS: &[&str] = &[
    MESSAGE_ID,
    TO,
    EXPIRY_TIME,
    ENQUEUED_TIME,
    CORRELATION_ID,
    USER_ID,
    CONNECTION_DEVICE_ID,
    CONNECTION_DEVICE_GENERATION_ID,
    CONNECTION_AUTH_METHOD,
    MESSAGE_SOURCE,
    PAYLOAD,
    PROPERTIES,
];

const AUTH_FIELDS: &[&str] = &["scope", "type", "issuer"];

/// Encode a message as compact JSON.
pub fn encode(msg: &Message) -> Vec<u8> {
    encode_with(msg, &CodecConfig::default())
}

/// Encode a message using `config`.
pub fn encode_with(msg: &Message, config: &CodecConfig) -> Vec<u8> {
    let out = wire::render(&to_value(msg), config.pretty);
    tracing::trace!(
        bytes = out.len(),
        dropped_transport_options = msg.transport_options.len(),
        "Encoded message"
    );
    out
}

/// Decode a message from JSON bytes.
pub fn decode(input: &[u8]) -> Result<Message> {
    decode_with(input, &CodecConfig::default())
}

/// Decode a message using `config`.
pub fn decode_with(input: &[u8], config: &CodecConfig) -> Result<Message> {
    let raw = wire::parse(input)?;
    from_value(&raw, config)
}

/// Build the JSON object for a message.
pub fn to_value(msg: &Message) -> Value {
    ObjectWriter::new()
        .string(MESSAGE_ID, &msg.message_id)
        .string(TO, &msg.to)
        .timestamp(EXPIRY_TIME, msg.expiry_time.as_ref())
        .timestamp(ENQUEUED_TIME, msg.enqueued_time.as_ref())
        .string(CORRELATION_ID, &msg.correlation_id)
        .string(USER_ID, &msg.user_id)
        .string(CONNECTION_DEVICE_ID, &msg.connection_device_id)
        .string(
            CONNECTION_DEVICE_GENERATION_ID,
            &msg.connection_device_generation_id,
        )
        .object(
            CONNECTION_AUTH_METHOD,
            msg.connection_auth_method.as_ref().map(auth_method_value),
        )
        .string(MESSAGE_SOURCE, &msg.message_source)
        .bytes(PAYLOAD, &msg.payload)
        .string_map(PROPERTIES, &msg.properties)
        .finish()
}

/// Read a message out of an already parsed JSON value.
pub fn from_value(raw: &Value, config: &CodecConfig) -> Result<Message> {
    let fields = Fields::root(raw)?;
    if config.log_unknown_fields {
        fields.skip_unknown(KNOWN_FIELDS, "Message");
    }

    let connection_auth_method = match fields.object(CONNECTION_AUTH_METHOD)? {
        Some(auth) => {
            if config.log_unknown_fields {
                auth.skip_unknown(AUTH_FIELDS, "ConnectionAuthMethod");
            }
            Some(ConnectionAuthMethod {
                scope: auth.string("scope")?,
                kind: auth.string("type")?,
                issuer: auth.string("issuer")?,
            })
        }
        None => None,
    };

    Ok(Message {
        message_id: fields.string(MESSAGE_ID)?,
        to: fields.string(TO)?,
        expiry_time: fields.timestamp(EXPIRY_TIME)?,
        enqueued_time: fields.timestamp(ENQUEUED_TIME)?,
        correlation_id: fields.string(CORRELATION_ID)?,
        user_id: fields.string(USER_ID)?,
        connection_device_id: fields.string(CONNECTION_DEVICE_ID)?,
        connection_device_generation_id: fields.string(CONNECTION_DEVICE_GENERATION_ID)?,
        connection_auth_method,
        message_source: fields.string(MESSAGE_SOURCE)?,
        payload: fields.bytes(PAYLOAD)?,
        properties: fields.string_map(PROPERTIES)?,
        transport_options: Default::default(),
    })
}

fn auth_method_value(auth: &ConnectionAuthMethod) -> Value {
    json!({
        "scope": auth.scope,
        "type": auth.kind,
        "issuer": auth.issuer,
    })
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        from_value(&raw, &CodecConfig::default()).map_err(D::Error::custom)
    }
}
