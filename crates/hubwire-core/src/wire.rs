//! JSON field readers and writers shared by the message and identity codecs.
//!
//! Readers implement the tolerant reader pattern: an absent key or a `null`
//! yields the field's zero value, unknown keys are skipped, and a present
//! value of the wrong shape is a decode error naming the wire field.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, ParseError, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Field name reported when the top-level value itself is malformed.
pub const ROOT: &str = "$";

/// Parse raw input into a JSON value.
pub(crate) fn parse(input: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(input)?)
}

/// Render a JSON value to UTF-8 bytes. Never fails.
pub(crate) fn render(value: &Value, pretty: bool) -> Vec<u8> {
    if pretty {
        format!("{value:#}").into_bytes()
    } else {
        value.to_string().into_bytes()
    }
}

/// Layout of timestamps whose year needs a sign or more than four digits.
const EXTENDED_YEAR_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// RFC 3339 rendering used for every typed timestamp on the wire.
///
/// Seconds are always present; fractional digits appear only when non-zero.
/// Years outside 0000..=9999 are written with a sign (`+10000-01-01T00:00:00Z`),
/// which [`parse_timestamp`] reads back.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a wire timestamp and normalize it to UTC.
///
/// Accepts RFC 3339 plus the signed extended-year form that
/// [`format_timestamp`] emits for years RFC 3339 cannot express.
pub fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, ParseError> {
    let parsed = match DateTime::parse_from_rfc3339(s) {
        Ok(t) => t,
        Err(e) if !s.starts_with(['+', '-']) => return Err(e),
        Err(_) => {
            let numeric = s.strip_suffix(['Z', 'z']).map(|rest| format!("{rest}+00:00"));
            DateTime::parse_from_str(numeric.as_deref().unwrap_or(s), EXTENDED_YEAR_FORMAT)?
        }
    };
    Ok(parsed.with_timezone(&Utc))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read-only view over one JSON object, tracking its dotted path.
pub(crate) struct Fields<'a> {
    obj: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    pub(crate) fn root(value: &'a Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            Error::decode(ROOT, format!("expected an object, found {}", kind(value)))
        })?;
        Ok(Self {
            obj,
            path: String::new(),
        })
    }

    fn name(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key).filter(|v| !v.is_null())
    }

    fn mismatch(&self, key: &str, expected: &str, found: &Value) -> Error {
        Error::decode(
            self.name(key),
            format!("expected {expected}, found {}", kind(found)),
        )
    }

    pub(crate) fn string(&self, key: &str) -> Result<String> {
        match self.get(key) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.mismatch(key, "a string", other)),
        }
    }

    pub(crate) fn timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Value::String(s) = value else {
            return Err(self.mismatch(key, "an RFC 3339 timestamp", value));
        };
        parse_timestamp(s)
            .map(Some)
            .map_err(|e| Error::decode(self.name(key), format!("invalid timestamp {s:?}: {e}")))
    }

    pub(crate) fn bytes(&self, key: &str) -> Result<Vec<u8>> {
        let Some(value) = self.get(key) else {
            return Ok(Vec::new());
        };
        let Value::String(s) = value else {
            return Err(self.mismatch(key, "a base64 string", value));
        };
        STANDARD
            .decode(s)
            .map_err(|e| Error::decode(self.name(key), format!("invalid base64: {e}")))
    }

    pub(crate) fn string_map(&self, key: &str) -> Result<HashMap<String, String>> {
        let Some(value) = self.get(key) else {
            return Ok(HashMap::new());
        };
        let Value::Object(entries) = value else {
            return Err(self.mismatch(key, "an object of strings", value));
        };
        entries
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                Value::Null => Ok((k.clone(), String::new())),
                other => Err(Error::decode(
                    self.name(key),
                    format!("entry {k:?}: expected a string, found {}", kind(other)),
                )),
            })
            .collect()
    }

    pub(crate) fn count(&self, key: &str) -> Result<u64> {
        match self.get(key) {
            None => Ok(0),
            Some(value) => value
                .as_u64()
                .ok_or_else(|| self.mismatch(key, "a non-negative integer", value)),
        }
    }

    /// Nested object under `key`, or `None` when absent or `null`.
    pub(crate) fn object(&self, key: &str) -> Result<Option<Self>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(obj)) => Ok(Some(Self {
                obj,
                path: self.name(key),
            })),
            Some(other) => Err(self.mismatch(key, "an object", other)),
        }
    }

    /// Log keys outside `known` that the decoder skipped.
    pub(crate) fn skip_unknown(&self, known: &[&str], record: &str) {
        for key in self.obj.keys().filter(|k| !known.contains(&k.as_str())) {
            tracing::debug!(record, field = %self.name(key), "Ignoring unknown field");
        }
    }
}

/// Builder for an outgoing JSON object.
#[derive(Default)]
pub(crate) struct ObjectWriter(Map<String, Value>);

impl ObjectWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Emit `value` unless it is empty.
    pub(crate) fn string(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.always(key, value)
        }
    }

    /// Emit `value` even when it is empty.
    pub(crate) fn always(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub(crate) fn timestamp(self, key: &str, value: Option<&DateTime<Utc>>) -> Self {
        match value {
            Some(time) => self.always(key, format_timestamp(time)),
            None => self,
        }
    }

    pub(crate) fn bytes(self, key: &str, value: &[u8]) -> Self {
        if value.is_empty() {
            self
        } else {
            self.always(key, STANDARD.encode(value))
        }
    }

    pub(crate) fn string_map(self, key: &str, value: &HashMap<String, String>) -> Self {
        if value.is_empty() {
            return self;
        }
        let entries: Map<String, Value> = value
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        self.always(key, Value::Object(entries))
    }

    pub(crate) fn object(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.always(key, v),
            None => self,
        }
    }

    pub(crate) fn finish(self) -> Value {
        Value::Object(self.0)
    }
}
