//! Stripped state events, as found in invite previews.

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use crate::codec::{self, EventContent, JsonCodec, impl_serde_via_codec};
use crate::error::EventResult;
use crate::event::Event;
use crate::outcome::Decoded;

/// Minimal projection of a state event, without room or server identity.
///
/// `Deref` → [`Event`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrippedEvent<C> {
    /// Embedded base fields (content, type).
    pub parent: Event<C>,
    /// User who sent the event.
    pub sender: String,
    /// State key the event applies to.
    pub state_key: String,
}

impl<C> Deref for StrippedEvent<C> {
    type Target = Event<C>;

    fn deref(&self) -> &Self::Target {
        &self.parent
    }
}

impl<C> DerefMut for StrippedEvent<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.parent
    }
}

impl<C: EventContent> JsonCodec for StrippedEvent<C> {
    const ENTITY: &'static str = "StrippedEvent";

    /// `sender` and `state_key` are read even when the base layer halted.
    fn from_json(obj: &Value) -> Decoded<Self> {
        let (parent, mut violations) = Event::from_json(obj).into_parts();
        let mut event = Self {
            parent,
            ..Self::default()
        };

        // The base layer already reported a non-object input.
        let Some(map) = obj.as_object() else {
            return Decoded::with_violations(event, violations);
        };

        let fields = codec::require_keys(Self::ENTITY, map, &["sender", "state_key"])
            .and_then(|()| {
                Ok((
                    codec::read_str(Self::ENTITY, map, "sender")?,
                    codec::read_str(Self::ENTITY, map, "state_key")?,
                ))
            });
        match fields {
            Ok((sender, state_key)) => {
                event.sender = sender;
                event.state_key = state_key;
            }
            Err(err) => violations.push(err),
        }

        Decoded::with_violations(event, violations)
    }

    fn to_json(&self) -> EventResult<Value> {
        let mut map = codec::into_object(Self::ENTITY, self.parent.to_json()?)?;
        map.insert("sender".into(), Value::from(self.sender.as_str()));
        map.insert("state_key".into(), Value::from(self.state_key.as_str()));
        Ok(Value::Object(map))
    }
}

impl_serde_via_codec!(StrippedEvent);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use crate::types::EventType;
    use serde_json::json;

    fn invite_member() -> Value {
        json!({
            "content": {"membership": "invite"},
            "type": "m.room.member",
            "sender": "@alice:example.org",
            "state_key": "@bob:example.org"
        })
    }

    #[test]
    fn test_round_trip() {
        let input = invite_member();
        let decoded = StrippedEvent::<Value>::from_json(&input);
        assert!(decoded.is_complete());

        let event = decoded.into_value();
        assert_eq!(event.event_type, EventType::RoomMember);
        assert_eq!(event.sender, "@alice:example.org");
        assert_eq!(event.state_key, "@bob:example.org");
        assert_eq!(event.to_json().unwrap(), input);
    }

    #[test]
    fn test_identity_read_after_base_halts() {
        let mut input = invite_member();
        input.as_object_mut().unwrap().remove("content");

        let decoded = StrippedEvent::<Value>::from_json(&input);
        assert!(matches!(
            decoded.violations(),
            [EventError::MissingField { entity: "Event", field: "content" }]
        ));

        let event = decoded.into_value();
        assert_eq!(event.parent, Event::default());
        assert_eq!(event.sender, "@alice:example.org");
    }

    #[test]
    fn test_missing_state_key_halts() {
        let mut input = invite_member();
        input.as_object_mut().unwrap().remove("state_key");

        let decoded = StrippedEvent::<Value>::from_json(&input);
        assert_eq!(
            decoded.violations(),
            [EventError::missing("StrippedEvent", "state_key")]
        );

        let event = decoded.into_value();
        assert_eq!(event.event_type, EventType::RoomMember);
        assert!(event.sender.is_empty());
    }

    #[test]
    fn test_encode_empty_identity_unconditionally() {
        let event = StrippedEvent {
            parent: Event::new(EventType::RoomName, json!({"name": "Lobby"})),
            ..Default::default()
        };
        assert_eq!(
            event.to_json().unwrap(),
            json!({
                "content": {"name": "Lobby"},
                "type": "m.room.name",
                "sender": "",
                "state_key": ""
            })
        );
    }
}
