//! Base event envelope.
//!
//! ```text
//! Event<C> { content, type }                          ← this module
//! ├── StrippedEvent<C> { sender, state_key }
//! └── RoomEvent<C> { event_id, room_id, sender, origin_server_ts, unsigned }
//!     └── StateEvent<C> { state_key, prev_content }
//! ```
//!
//! Each child embeds its parent in a `parent` field and `Deref`s to it, so
//! `state.content` and `state.event_id` both resolve through the chain.

use serde_json::{Map, Value};

use crate::codec::{self, EventContent, JsonCodec, impl_serde_via_codec};
use crate::error::{EventError, EventResult};
use crate::outcome::Decoded;
use crate::types::EventType;

/// A discriminant paired with its content payload.
///
/// Nothing checks that `content` matches `event_type`; that is the caller's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event<C> {
    /// Type-specific payload.
    pub content: C,
    /// Semantic kind, written as the `type` key.
    pub event_type: EventType,
}

impl<C> Event<C> {
    /// Creates an event from its parts.
    pub fn new(event_type: EventType, content: C) -> Self {
        Self {
            content,
            event_type,
        }
    }
}

impl<C: EventContent> JsonCodec for Event<C> {
    const ENTITY: &'static str = "Event";

    /// Requires both `content` and `type`; if either is missing the event stays
    /// at its default. A content codec failure leaves `content` at its default
    /// while `event_type` is still resolved.
    fn from_json(obj: &Value) -> Decoded<Self> {
        let map = match codec::as_object(Self::ENTITY, obj) {
            Ok(map) => map,
            Err(err) => return Decoded::with_violations(Self::default(), vec![err]),
        };
        if let Err(err) = codec::require_keys(Self::ENTITY, map, &["content", "type"]) {
            return Decoded::with_violations(Self::default(), vec![err]);
        }

        let mut violations = Vec::new();
        let event_type = EventType::resolve_object(obj);
        if !map["type"].is_string() {
            violations.push(EventError::invalid(
                Self::ENTITY,
                "type",
                format!("expected a string, found {}", codec::json_kind(&map["type"])),
            ));
        }
        let content = codec::decode_content(Self::ENTITY, "content", &map["content"])
            .unwrap_or_else(|err| {
                violations.push(err);
                C::default()
            });

        Decoded::with_violations(Self::new(event_type, content), violations)
    }

    fn to_json(&self) -> EventResult<Value> {
        let event_type = self
            .event_type
            .render()
            .ok_or(EventError::UnrenderableType)?;

        let mut map = Map::new();
        map.insert(
            "content".into(),
            codec::encode_content(Self::ENTITY, &self.content)?,
        );
        map.insert("type".into(), Value::String(event_type.to_owned()));
        Ok(Value::Object(map))
    }
}

impl_serde_via_codec!(Event);
