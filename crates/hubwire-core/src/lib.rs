//! Hubwire Core Library
//!
//! Protocol-neutral data model for traffic with a device-management hub:
//! - `Message` envelope for device-to-cloud and cloud-to-device payloads
//! - `ModuleIdentity` registry record for modules hosted on devices
//! - JSON codecs for both, with field-level decode errors
//! - Codec configuration and tracing setup

pub mod config;
pub mod error;
pub mod message;
pub mod module_identity;
pub mod tracing_init;
pub mod wire;

pub use config::CodecConfig;
pub use error::{Error, Result};
pub use message::{ConnectionAuthMethod, Message, TransportOptions};
pub use module_identity::{
    Authentication, AuthenticationType, Credential, ModuleIdentity, SymmetricKey, X509Thumbprint,
};
