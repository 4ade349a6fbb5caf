//! Room (timeline) events.
//!
//! Some servers repeat the keys of `unsigned` as top-level siblings. Those
//! duplicates are not read back into [`RoomEvent::unsigned_data`]; only the
//! nested object is authoritative here.

use std::ops::{Deref, DerefMut};

use serde_json::{Map, Value};

use crate::codec::{self, EmitPolicy, EventContent, JsonCodec, impl_serde_via_codec};
use crate::error::{EventError, EventResult};
use crate::event::Event;
use crate::outcome::Decoded;
use crate::unsigned::UnsignedData;

/// `room_id` is absent from the state array of sync responses.
const ROOM_ID_POLICY: EmitPolicy = EmitPolicy::OmitIfDefault;

/// A timeline event with full identity.
///
/// `Deref` → [`Event`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomEvent<C> {
    /// Embedded base fields (content, type).
    pub parent: Event<C>,
    /// Globally unique event id.
    pub event_id: String,
    /// Room the event belongs to, when the server includes it.
    pub room_id: Option<String>,
    /// User who sent the event.
    pub sender: String,
    /// Origin server timestamp in milliseconds since the Unix epoch.
    pub origin_server_ts: u64,
    /// Server-attached metadata from the `unsigned` key.
    pub unsigned_data: UnsignedData<C>,
}

impl<C> Deref for RoomEvent<C> {
    type Target = Event<C>;

    fn deref(&self) -> &Self::Target {
        &self.parent
    }
}

impl<C> DerefMut for RoomEvent<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.parent
    }
}

/// Reads `origin_server_ts` as a JSON float and truncates it to milliseconds.
///
/// Servers are not consistent about emitting an integer here, so the value
/// goes through `f64` on purpose. Values that do not fit a `u64` are rejected
/// rather than saturated.
fn read_timestamp(entity: &'static str, map: &Map<String, Value>) -> EventResult<u64> {
    let raw = &map["origin_server_ts"];
    let ts = raw.as_f64().ok_or_else(|| {
        EventError::invalid(
            entity,
            "origin_server_ts",
            format!("expected a number, found {}", codec::json_kind(raw)),
        )
    })?;
    codec::truncate_to_u64(entity, "origin_server_ts", ts)
}

impl<C: EventContent> JsonCodec for RoomEvent<C> {
    const ENTITY: &'static str = "RoomEvent";

    /// Halts after the base layer if `event_id`, `sender` or
    /// `origin_server_ts` is missing; base fields are kept either way.
    fn from_json(obj: &Value) -> Decoded<Self> {
        let (parent, mut violations) = Event::from_json(obj).into_parts();
        let mut event = Self {
            parent,
            ..Self::default()
        };

        let Some(map) = obj.as_object() else {
            return Decoded::with_violations(event, violations);
        };

        let identity =
            codec::require_keys(Self::ENTITY, map, &["event_id", "sender", "origin_server_ts"])
                .and_then(|()| {
                    Ok((
                        codec::read_str(Self::ENTITY, map, "event_id")?,
                        codec::read_str(Self::ENTITY, map, "sender")?,
                        read_timestamp(Self::ENTITY, map)?,
                    ))
                });
        match identity {
            Ok((event_id, sender, origin_server_ts)) => {
                event.event_id = event_id;
                event.sender = sender;
                event.origin_server_ts = origin_server_ts;
            }
            Err(err) => {
                violations.push(err);
                return Decoded::with_violations(event, violations);
            }
        }

        match codec::read_opt_str(Self::ENTITY, map, "room_id") {
            Ok(room_id) => event.room_id = room_id,
            Err(err) => violations.push(err),
        }

        if let Some(unsigned) = map.get("unsigned") {
            let (data, errs) = UnsignedData::from_json(unsigned).into_parts();
            event.unsigned_data = data;
            violations.extend(errs);
        }

        Decoded::with_violations(event, violations)
    }

    fn to_json(&self) -> EventResult<Value> {
        let mut map = codec::into_object(Self::ENTITY, self.parent.to_json()?)?;

        let room_id = self.room_id.as_deref().unwrap_or_default();
        if ROOM_ID_POLICY.emits(room_id.is_empty()) {
            map.insert("room_id".into(), Value::from(room_id));
        }
        map.insert("event_id".into(), Value::from(self.event_id.as_str()));
        map.insert("sender".into(), Value::from(self.sender.as_str()));
        map.insert("unsigned".into(), self.unsigned_data.to_json()?);
        map.insert(
            "origin_server_ts".into(),
            Value::from(self.origin_server_ts),
        );

        Ok(Value::Object(map))
    }
}

impl_serde_via_codec!(RoomEvent);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventType;
    use serde_json::json;

    fn message() -> Value {
        json!({
            "content": {"body": "hello", "msgtype": "m.text"},
            "type": "m.room.message",
            "event_id": "$143273582443PhrSn:example.org",
            "room_id": "!jEsUZKDJdhlrceRyVU:example.org",
            "sender": "@example:example.org",
            "origin_server_ts": 1432735824653u64,
            "unsigned": {
                "age": 1234,
                "transaction_id": "m1234",
                "prev_content": {}
            }
        })
    }

    #[test]
    fn test_round_trip() {
        let input = message();
        let decoded = RoomEvent::<Value>::from_json(&input);
        assert!(decoded.is_complete(), "{:?}", decoded.violations());

        let event = decoded.into_value();
        assert_eq!(event.event_type, EventType::RoomMessage);
        assert_eq!(event.content["body"], "hello");
        assert_eq!(
            event.room_id.as_deref(),
            Some("!jEsUZKDJdhlrceRyVU:example.org")
        );
        assert_eq!(event.origin_server_ts, 1432735824653);
        assert_eq!(event.unsigned_data.age, 1234);
        assert_eq!(event.to_json().unwrap(), input);
    }

    #[test]
    fn test_fractional_timestamp() {
        let mut input = message();
        input["origin_server_ts"] = json!(1609459200000.0);
        let event = RoomEvent::<Value>::from_json(&input).into_value();
        assert_eq!(event.origin_server_ts, 1609459200000);

        input["origin_server_ts"] = json!(1609459200000.75);
        let event = RoomEvent::<Value>::from_json(&input).into_value();
        assert_eq!(event.origin_server_ts, 1609459200000);
    }

    #[test]
    fn test_missing_event_id_halts() {
        let mut input = message();
        input.as_object_mut().unwrap().remove("event_id");

        let decoded = RoomEvent::<Value>::from_json(&input);
        assert_eq!(
            decoded.violations(),
            [EventError::missing("RoomEvent", "event_id")]
        );

        let event = decoded.into_value();
        // Base fields survive; identity fields stay default.
        assert_eq!(event.event_type, EventType::RoomMessage);
        assert!(event.sender.is_empty());
        assert_eq!(event.origin_server_ts, 0);
        assert_eq!(event.room_id, None);
        assert_eq!(event.unsigned_data, UnsignedData::default());
    }

    #[test]
    fn test_negative_timestamp_is_invalid() {
        let mut input = message();
        input["origin_server_ts"] = json!(-5);
        let decoded = RoomEvent::<Value>::from_json(&input);
        assert!(matches!(
            decoded.violations(),
            [EventError::InvalidField { field: "origin_server_ts", .. }]
        ));
        assert!(decoded.value().event_id.is_empty());
    }

    #[test]
    fn test_oversized_timestamp_is_invalid() {
        let mut input = message();
        input["origin_server_ts"] = json!(1e30);
        let decoded = RoomEvent::<Value>::from_json(&input);
        assert!(matches!(
            decoded.violations(),
            [EventError::InvalidField { field: "origin_server_ts", .. }]
        ));
        assert_eq!(decoded.value().origin_server_ts, 0);
        assert!(decoded.value().sender.is_empty());
    }

    #[test]
    fn test_non_object_unsigned_is_skipped() {
        let mut input = message();
        input["unsigned"] = json!("x");
        let decoded = RoomEvent::<Value>::from_json(&input);
        assert_eq!(
            decoded.violations(),
            [EventError::NotAnObject {
                entity: "UnsignedData"
            }]
        );

        let event = decoded.into_value();
        assert_eq!(event.event_id, "$143273582443PhrSn:example.org");
        assert_eq!(event.sender, "@example:example.org");
        assert_eq!(event.origin_server_ts, 1432735824653);
        assert_eq!(
            event.room_id.as_deref(),
            Some("!jEsUZKDJdhlrceRyVU:example.org")
        );
        assert_eq!(event.unsigned_data, UnsignedData::default());
    }

    #[test]
    fn test_room_id_and_unsigned_optional() {
        let mut input = message();
        let map = input.as_object_mut().unwrap();
        map.remove("room_id");
        map.remove("unsigned");

        let decoded = RoomEvent::<Value>::from_json(&input);
        assert!(decoded.is_complete());

        let event = decoded.into_value();
        assert_eq!(event.room_id, None);
        assert_eq!(event.unsigned_data, UnsignedData::default());

        let encoded = event.to_json().unwrap();
        assert!(encoded.get("room_id").is_none());
        assert_eq!(encoded["unsigned"], json!({"prev_content": null}));
    }

    #[test]
    fn test_top_level_unsigned_duplicates_ignored() {
        let mut input = message();
        let map = input.as_object_mut().unwrap();
        map.remove("unsigned");
        map.insert("age".into(), json!(99));
        map.insert("transaction_id".into(), json!("top-level"));

        let event = RoomEvent::<Value>::from_json(&input).into_value();
        assert_eq!(event.unsigned_data.age, 0);
        assert!(event.unsigned_data.transaction_id.is_empty());
    }

    #[test]
    fn test_empty_room_id_not_emitted() {
        let mut event = RoomEvent::<Value>::from_json(&message()).into_value();
        event.room_id = Some(String::new());
        assert!(event.to_json().unwrap().get("room_id").is_none());
    }
}
