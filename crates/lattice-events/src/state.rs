//! Room state events.

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use crate::codec::{self, EventContent, JsonCodec, impl_serde_via_codec};
use crate::error::EventResult;
use crate::outcome::Decoded;
use crate::room::RoomEvent;

/// A room event that sets a piece of room state.
///
/// `Deref` chain: `StateEvent` → [`RoomEvent`] → [`Event`](crate::Event).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateEvent<C> {
    /// Embedded room event fields.
    pub parent: RoomEvent<C>,
    /// Key identifying which state entry of this type is set.
    pub state_key: String,
    /// Previous content, read from the top-level `prev_content` key.
    ///
    /// Populated independently of `unsigned_data.prev_content`; servers may
    /// send either, both or neither.
    pub prev_content: C,
}

impl<C> Deref for StateEvent<C> {
    type Target = RoomEvent<C>;

    fn deref(&self) -> &Self::Target {
        &self.parent
    }
}

impl<C> DerefMut for StateEvent<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.parent
    }
}

impl<C: EventContent> JsonCodec for StateEvent<C> {
    const ENTITY: &'static str = "StateEvent";

    /// A missing `state_key` halts only the state-specific fields; whatever the
    /// room layer populated is kept.
    fn from_json(obj: &Value) -> Decoded<Self> {
        let (parent, mut violations) = RoomEvent::from_json(obj).into_parts();
        let mut event = Self {
            parent,
            ..Self::default()
        };

        let Some(map) = obj.as_object() else {
            return Decoded::with_violations(event, violations);
        };

        let state_key = codec::require_keys(Self::ENTITY, map, &["state_key"])
            .and_then(|()| codec::read_str(Self::ENTITY, map, "state_key"));
        match state_key {
            Ok(state_key) => event.state_key = state_key,
            Err(err) => {
                violations.push(err);
                return Decoded::with_violations(event, violations);
            }
        }

        if let Some(prev) = map.get("prev_content") {
            match codec::decode_content(Self::ENTITY, "prev_content", prev) {
                Ok(content) => event.prev_content = content,
                Err(err) => violations.push(err),
            }
        }

        Decoded::with_violations(event, violations)
    }

    fn to_json(&self) -> EventResult<Value> {
        let mut map = codec::into_object(Self::ENTITY, self.parent.to_json()?)?;
        map.insert("state_key".into(), Value::from(self.state_key.as_str()));
        map.insert(
            "prev_content".into(),
            codec::encode_content(Self::ENTITY, &self.prev_content)?,
        );
        Ok(Value::Object(map))
    }
}

impl_serde_via_codec!(StateEvent);
