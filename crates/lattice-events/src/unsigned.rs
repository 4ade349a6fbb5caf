//! Unsigned metadata attached to timeline events by the server.
//!
//! Every field is optional on the wire. Decoding populates a field only when
//! its key is present; encoding follows [`UNSIGNED_FIELD_POLICY`].

use serde_json::{Map, Value};

use crate::codec::{self, EmitPolicy, EventContent, JsonCodec, impl_serde_via_codec};
use crate::error::{EventError, EventResult};
use crate::outcome::Decoded;

/// Encode policy per wire key.
///
/// `prev_content` is written even when default-constructed; existing
/// consumers expect the key to be there.
pub const UNSIGNED_FIELD_POLICY: [(&str, EmitPolicy); 5] = [
    ("prev_sender", EmitPolicy::OmitIfDefault),
    ("transaction_id", EmitPolicy::OmitIfDefault),
    ("replaces_state", EmitPolicy::OmitIfDefault),
    ("age", EmitPolicy::OmitIfDefault),
    ("prev_content", EmitPolicy::Always),
];

fn policy_for(field: &str) -> EmitPolicy {
    UNSIGNED_FIELD_POLICY
        .iter()
        .find(|(key, _)| *key == field)
        .map_or(EmitPolicy::Always, |(_, policy)| *policy)
}

/// Reads `age`, accepting whole or fractional JSON numbers; fractions are
/// truncated like `origin_server_ts`.
fn read_age(raw: &Value) -> EventResult<u64> {
    if let Some(age) = raw.as_u64() {
        return Ok(age);
    }
    let age = raw.as_f64().ok_or_else(|| {
        EventError::invalid(
            UnsignedData::<Value>::ENTITY,
            "age",
            format!("expected a number, found {}", codec::json_kind(raw)),
        )
    })?;
    codec::truncate_to_u64(UnsignedData::<Value>::ENTITY, "age", age)
}

/// Server-attached annotations on a room event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnsignedData<C> {
    /// Milliseconds since the event was sent.
    pub age: u64,
    /// Client transaction id, echoed back to the sending device only.
    pub transaction_id: String,
    /// Sender of the state event this one replaced.
    pub prev_sender: String,
    /// Event id of the state event this one replaced.
    pub replaces_state: String,
    /// Content of the state event this one replaced.
    pub prev_content: C,
}

impl<C: EventContent> JsonCodec for UnsignedData<C> {
    const ENTITY: &'static str = "UnsignedData";

    fn from_json(obj: &Value) -> Decoded<Self> {
        let mut data = Self::default();
        let map = match codec::as_object(Self::ENTITY, obj) {
            Ok(map) => map,
            Err(err) => return Decoded::with_violations(data, vec![err]),
        };

        let mut violations = Vec::new();

        if let Some(age) = map.get("age") {
            match read_age(age) {
                Ok(age) => data.age = age,
                Err(err) => violations.push(err),
            }
        }

        for (field, slot) in [
            ("transaction_id", &mut data.transaction_id),
            ("prev_sender", &mut data.prev_sender),
            ("replaces_state", &mut data.replaces_state),
        ] {
            match codec::read_opt_str(Self::ENTITY, map, field) {
                Ok(Some(s)) => *slot = s,
                Ok(None) => {}
                Err(err) => violations.push(err),
            }
        }

        if let Some(prev) = map.get("prev_content") {
            match codec::decode_content(Self::ENTITY, "prev_content", prev) {
                Ok(content) => data.prev_content = content,
                Err(err) => violations.push(err),
            }
        }

        Decoded::with_violations(data, violations)
    }

    fn to_json(&self) -> EventResult<Value> {
        let mut map = Map::new();
        let mut put = |key: &'static str, is_default: bool, value: Value| {
            if policy_for(key).emits(is_default) {
                map.insert(key.into(), value);
            }
        };

        put(
            "prev_sender",
            self.prev_sender.is_empty(),
            Value::from(self.prev_sender.as_str()),
        );
        put(
            "transaction_id",
            self.transaction_id.is_empty(),
            Value::from(self.transaction_id.as_str()),
        );
        put(
            "replaces_state",
            self.replaces_state.is_empty(),
            Value::from(self.replaces_state.as_str()),
        );
        put("age", self.age == 0, Value::from(self.age));
        put(
            "prev_content",
            false,
            codec::encode_content(Self::ENTITY, &self.prev_content)?,
        );

        Ok(Value::Object(map))
    }
}

impl_serde_via_codec!(UnsignedData);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_empty() {
        let decoded = UnsignedData::<Value>::from_json(&json!({}));
        assert!(decoded.is_complete());
        assert_eq!(decoded.into_value(), UnsignedData::default());
    }

    #[test]
    fn test_decode_age_only() {
        let data = UnsignedData::<Value>::from_json(&json!({"age": 5})).into_value();
        assert_eq!(data.age, 5);
        assert!(data.transaction_id.is_empty());
        assert!(data.prev_sender.is_empty());
        assert!(data.replaces_state.is_empty());
        assert_eq!(data.prev_content, Value::Null);
    }

    #[test]
    fn test_decode_float_age() {
        let decoded = UnsignedData::<Value>::from_json(&json!({"age": 5.0}));
        assert!(decoded.is_complete(), "{:?}", decoded.violations());
        assert_eq!(decoded.value().age, 5);

        let data = UnsignedData::<Value>::from_json(&json!({"age": 1234.9})).into_value();
        assert_eq!(data.age, 1234);

        let decoded = UnsignedData::<Value>::from_json(&json!({"age": "5"}));
        assert!(matches!(
            decoded.violations(),
            [EventError::InvalidField { field: "age", reason, .. }] if reason.contains("a string")
        ));
    }

    #[test]
    fn test_encode_defaults_only_prev_content() {
        let data = UnsignedData::<Value>::default();
        assert_eq!(data.to_json().unwrap(), json!({"prev_content": null}));
    }

    #[test]
    fn test_round_trip_full() {
        let input = json!({
            "age": 1234,
            "transaction_id": "txn1",
            "prev_sender": "@alice:example.org",
            "replaces_state": "$prev:example.org",
            "prev_content": {"membership": "invite"}
        });
        let decoded = UnsignedData::<Value>::from_json(&input);
        assert!(decoded.is_complete());
        assert_eq!(decoded.value().to_json().unwrap(), input);
    }

    #[test]
    fn test_bad_fields_are_independent() {
        let input = json!({"age": -1, "transaction_id": 7, "prev_sender": "@bob:example.org"});
        let decoded = UnsignedData::<Value>::from_json(&input);
        assert_eq!(decoded.violations().len(), 2);

        let data = decoded.into_value();
        assert_eq!(data.age, 0);
        assert!(data.transaction_id.is_empty());
        assert_eq!(data.prev_sender, "@bob:example.org");
    }

    #[test]
    fn test_policy_table() {
        assert_eq!(policy_for("age"), EmitPolicy::OmitIfDefault);
        assert_eq!(policy_for("prev_content"), EmitPolicy::Always);
    }
}
