//! Shared codec plumbing for the envelope layers.
//!
//! Every envelope implements [`JsonCodec`]. Decoding reads from a borrowed
//! `serde_json::Value` and always yields a [`Decoded`] value; encoding builds a
//! fresh JSON object. Nothing here keeps state between calls.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{EventError, EventResult};
use crate::outcome::Decoded;

// ============================================================================
// Content
// ============================================================================

/// A type-specific event payload.
///
/// Any default-constructible serde type qualifies, including
/// `serde_json::Value` for opaque payloads. Its serde impls must be reentrant,
/// since envelopes call into them from whichever thread is decoding.
pub trait EventContent: Default + Serialize + DeserializeOwned {}

impl<T> EventContent for T where T: Default + Serialize + DeserializeOwned {}

// ============================================================================
// JsonCodec
// ============================================================================

/// Decode/encode contract shared by every envelope.
pub trait JsonCodec: Sized {
    /// Name used in violations and log records.
    const ENTITY: &'static str;

    /// Decodes an event object. Never fails; violations travel with the value.
    fn from_json(obj: &Value) -> Decoded<Self>;

    /// Encodes into a JSON object.
    fn to_json(&self) -> EventResult<Value>;

    /// Parses raw JSON text and decodes it.
    fn parse(raw: &str) -> EventResult<Decoded<Self>> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_json(&value))
    }
}

// ============================================================================
// Emit Policy
// ============================================================================

/// Whether an optional field is written when it holds its default value.
///
/// Decoding always tests for key presence; encoding follows this policy, so
/// the two directions are deliberately asymmetric for some fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitPolicy {
    /// Skip the key when the value equals its default.
    OmitIfDefault,
    /// Always write the key.
    Always,
}

impl EmitPolicy {
    /// Returns `true` if a field with this policy should be written.
    pub fn emits(self, is_default: bool) -> bool {
        match self {
            Self::OmitIfDefault => !is_default,
            Self::Always => true,
        }
    }
}

// ============================================================================
// Field Readers
// ============================================================================

pub(crate) fn as_object<'a>(
    entity: &'static str,
    obj: &'a Value,
) -> EventResult<&'a Map<String, Value>> {
    obj.as_object().ok_or(EventError::NotAnObject { entity })
}

/// Checks that every key is present, reporting the first one that is not.
pub(crate) fn require_keys(
    entity: &'static str,
    map: &Map<String, Value>,
    keys: &[&'static str],
) -> EventResult<()> {
    match keys.iter().copied().find(|key| !map.contains_key(*key)) {
        Some(field) => {
            debug!(entity, field, "Event is missing a required field");
            Err(EventError::missing(entity, field))
        }
        None => Ok(()),
    }
}

pub(crate) fn read_str(
    entity: &'static str,
    map: &Map<String, Value>,
    field: &'static str,
) -> EventResult<String> {
    match map.get(field) {
        None => Err(EventError::missing(entity, field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(EventError::invalid(
            entity,
            field,
            format!("expected a string, found {}", json_kind(other)),
        )),
    }
}

/// Reads an optional string; `Ok(None)` when the key is absent.
pub(crate) fn read_opt_str(
    entity: &'static str,
    map: &Map<String, Value>,
    field: &'static str,
) -> EventResult<Option<String>> {
    if map.contains_key(field) {
        read_str(entity, map, field).map(Some)
    } else {
        Ok(None)
    }
}

/// Truncates a JSON number to a `u64`.
///
/// Negative, non-finite and out-of-range values are rejected; `u64::MAX as f64`
/// rounds up to 2^64, which is itself out of range.
pub(crate) fn truncate_to_u64(
    entity: &'static str,
    field: &'static str,
    value: f64,
) -> EventResult<u64> {
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return Err(EventError::invalid(
            entity,
            field,
            format!("{value} does not fit an unsigned 64-bit integer"),
        ));
    }
    Ok(value as u64)
}

/// Runs the content codec, logging and reporting any failure.
pub(crate) fn decode_content<C: EventContent>(
    entity: &'static str,
    field: &'static str,
    value: &Value,
) -> EventResult<C> {
    C::deserialize(value).map_err(|e| {
        warn!(entity, field, error = %e, "Failed to decode event content");
        EventError::ContentDecode {
            entity,
            field,
            reason: e.to_string(),
        }
    })
}

pub(crate) fn encode_content<C: EventContent>(entity: &'static str, content: &C) -> EventResult<Value> {
    serde_json::to_value(content).map_err(|e| EventError::ContentEncode {
        entity,
        reason: e.to_string(),
    })
}

/// Encodes `value` and returns its object map.
///
/// Parent layers always encode to objects, so any other shape is a bug in a
/// `to_json` impl and surfaces as `NotAnObject`.
pub(crate) fn into_object(
    entity: &'static str,
    value: Value,
) -> EventResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(EventError::NotAnObject { entity }),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn log_violations(entity: &'static str, violations: &[EventError]) {
    for violation in violations {
        debug!(entity, %violation, "Accepted partially decoded event");
    }
}

/// Implements serde traits for an envelope by delegating to [`JsonCodec`].
///
/// Deserializing is fail-soft: violations are logged and the partial value is
/// returned.
macro_rules! impl_serde_via_codec {
    ($ty:ident) => {
        impl<C: $crate::codec::EventContent> ::serde::Serialize for $ty<C> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                let value = $crate::codec::JsonCodec::to_json(self)
                    .map_err(<S::Error as ::serde::ser::Error>::custom)?;
                ::serde::Serialize::serialize(&value, serializer)
            }
        }

        impl<'de, C: $crate::codec::EventContent> ::serde::Deserialize<'de> for $ty<C> {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let value = <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                let decoded = <Self as $crate::codec::JsonCodec>::from_json(&value);
                $crate::codec::log_violations(
                    <Self as $crate::codec::JsonCodec>::ENTITY,
                    decoded.violations(),
                );
                Ok(decoded.into_value())
            }
        }
    };
}

pub(crate) use impl_serde_via_codec;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_policy() {
        assert!(!EmitPolicy::OmitIfDefault.emits(true));
        assert!(EmitPolicy::OmitIfDefault.emits(false));
        assert!(EmitPolicy::Always.emits(true));
    }

    #[test]
    fn test_require_keys_reports_first_missing() {
        let obj = json!({"sender": "@a:b"});
        let map = obj.as_object().unwrap();
        assert_eq!(
            require_keys("RoomEvent", map, &["event_id", "sender", "origin_server_ts"]),
            Err(EventError::missing("RoomEvent", "event_id"))
        );
        assert!(require_keys("RoomEvent", map, &["sender"]).is_ok());
    }

    #[test]
    fn test_read_str_wrong_type() {
        let obj = json!({"sender": 12});
        let map = obj.as_object().unwrap();
        let err = read_str("StrippedEvent", map, "sender").unwrap_err();
        assert!(matches!(
            err,
            EventError::InvalidField { field: "sender", ref reason, .. } if reason.contains("a number")
        ));
        assert_eq!(read_opt_str("StrippedEvent", map, "room_id"), Ok(None));
    }

    #[test]
    fn test_truncate_to_u64() {
        assert_eq!(truncate_to_u64("RoomEvent", "origin_server_ts", 5.9), Ok(5));
        assert_eq!(truncate_to_u64("RoomEvent", "origin_server_ts", 0.0), Ok(0));
        for bad in [-1.0, f64::NAN, f64::INFINITY, 1e30, u64::MAX as f64] {
            assert!(truncate_to_u64("RoomEvent", "origin_server_ts", bad).is_err());
        }
    }

    #[test]
    fn test_decode_content_failure() {
        let err = decode_content::<Vec<String>>("Event", "content", &json!({"a": 1})).unwrap_err();
        assert!(matches!(err, EventError::ContentDecode { field: "content", .. }));
    }
}
