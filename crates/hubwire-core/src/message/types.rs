//! Message types for the Hub's device-facing protocols.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Transport-specific hints attached to a message. Never serialized.
pub type TransportOptions = HashMap<String, Value>;

/// Common message envelope for device-to-cloud and cloud-to-device traffic.
///
/// Empty strings, empty payloads, empty maps and `None` are all "absent" on
/// the wire. Fields marked Hub-stamped are filled in by the receiving side
/// and must not be altered by consumers.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// User-settable identifier, echoed by replies in `correlation_id`.
    pub message_id: String,
    /// Destination address of a cloud-to-device message.
    pub to: String,
    /// Moment after which the message must not be delivered.
    pub expiry_time: Option<DateTime<Utc>>,
    /// When the Hub accepted a cloud-to-device message. Hub-stamped.
    pub enqueued_time: Option<DateTime<Utc>>,
    /// In replies, the `message_id` of the request.
    pub correlation_id: String,
    /// Origin principal.
    pub user_id: String,
    /// Device id of the sender. Hub-stamped.
    pub connection_device_id: String,
    /// Generation id of the sending device. Hub-stamped.
    pub connection_device_generation_id: String,
    /// How the sender authenticated. Hub-stamped.
    pub connection_auth_method: Option<ConnectionAuthMethod>,
    /// Transport the device-to-cloud message arrived on.
    pub message_source: String,
    /// Opaque application body, carried verbatim.
    pub payload: Vec<u8>,
    /// User-defined property bag.
    pub properties: HashMap<String, String>,
    /// Hints read by transport bindings.
    pub transport_options: TransportOptions,
}

// Transport options are not part of a message's wire identity.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.message_id == other.message_id
            && self.to == other.to
            && self.expiry_time == other.expiry_time
            && self.enqueued_time == other.enqueued_time
            && self.correlation_id == other.correlation_id
            && self.user_id == other.user_id
            && self.connection_device_id == other.connection_device_id
            && self.connection_device_generation_id == other.connection_device_generation_id
            && self.connection_auth_method == other.connection_auth_method
            && self.message_source == other.message_source
            && self.payload == other.payload
            && self.properties == other.properties
    }
}

impl Eq for Message {}

impl Message {
    /// Create a message carrying `payload` and nothing else.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Add or replace one entry in the property bag.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add or replace one transport hint.
    #[must_use]
    pub fn with_transport_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.transport_options.insert(key.into(), value.into());
        self
    }

    /// Empty reply to this message, correlated through its `message_id`.
    pub fn reply(&self) -> Self {
        Self {
            correlation_id: self.message_id.clone(),
            ..Self::default()
        }
    }

    /// Whether the message has an expiry and `now` is at or past it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_time.is_some_and(|expiry| now >= expiry)
    }
}

/// How the sender of a device-to-cloud message authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConnectionAuthMethod {
    pub scope: String,
    /// Written as `type` on the wire.
    pub kind: String,
    pub issuer: String,
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn equality_ignores_transport_options() {
        let plain = Message::new(*b"x");
        let hinted = Message::new(*b"x").with_transport_option("qos", 1);
        assert_eq!(plain, hinted);
    }

    #[test]
    fn reply_correlates_to_request() {
        let mut request = Message::new(*b"ping");
        request.message_id = "req-42".into();
        request.user_id = "svc".into();
        let reply = request.reply();
        assert_eq!(reply.correlation_id, "req-42");
        assert!(reply.message_id.is_empty());
        assert!(reply.payload.is_empty());
        assert!(reply.user_id.is_empty());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let expiry = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let msg = Message {
            expiry_time: Some(expiry),
            ..Message::default()
        };
        assert!(!msg.is_expired_at(expiry - TimeDelta::milliseconds(1)));
        assert!(msg.is_expired_at(expiry));
        assert!(!Message::default().is_expired_at(expiry));
    }

    #[test]
    fn properties_and_transport_options_stay_apart() {
        let msg = Message::default()
            .with_property("k", "v")
            .with_transport_option("k", "hint");
        assert_eq!(msg.properties.len(), 1);
        assert_eq!(msg.transport_options.len(), 1);
        assert_eq!(msg.properties["k"], "v");
    }
}
