//! Management-plane identity of a module hosted on a device.

mod codec;
mod types;

pub use codec::{decode, decode_with, encode, encode_with, from_value, to_value};
pub use codec::{
    AUTHENTICATION, CLOUD_TO_DEVICE_MESSAGE_COUNT, CONNECTION_STATE,
    CONNECTION_STATE_UPDATED_TIME, DEVICE_ID, ETAG, GENERATION_ID, LAST_ACTIVITY_TIME,
    MANAGED_BY, MODULE_ID,
};
pub use types::*;
