//! Message envelope shared by all device-facing protocols.
//!
//! The same [`Message`] carries device-to-cloud telemetry and cloud-to-device
//! commands. [`encode`] and [`decode`] implement the Hub's JSON shape.

mod codec;
mod types;

pub use codec::{decode, decode_with, encode, encode_with, from_value, to_value};
pub use codec::{
    CONNECTION_AUTH_METHOD, CONNECTION_DEVICE_GENERATION_ID, CONNECTION_DEVICE_ID,
    CORRELATION_ID, ENQUEUED_TIME, EXPIRY_TIME, MESSAGE_ID, MESSAGE_SOURCE, PAYLOAD, PROPERTIES,
    TO, USER_ID,
};
pub use types::*;
