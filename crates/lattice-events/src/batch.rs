//! Layer detection and batch decoding.
//!
//! A sync response mixes stripped, room and state events. [`EventLayer::detect`]
//! picks the most specific envelope from the keys present, and
//! [`decode_batch`] decodes a whole array without letting one bad element
//! abort the rest.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::codec::{EventContent, JsonCodec};
use crate::error::EventResult;
use crate::event::Event;
use crate::outcome::Decoded;
use crate::room::RoomEvent;
use crate::state::StateEvent;
use crate::stripped::StrippedEvent;
use crate::types::EventType;

/// Which envelope an event object should be decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLayer {
    /// [`Event`]
    Base,
    /// [`StrippedEvent`]
    Stripped,
    /// [`RoomEvent`]
    Room,
    /// [`StateEvent`]
    State,
}

impl EventLayer {
    /// Guesses the layer from the keys present in `obj`.
    pub fn detect(obj: &Value) -> Self {
        let has = |key: &str| obj.get(key).is_some();
        match (has("event_id"), has("state_key"), has("sender")) {
            (true, true, _) => Self::State,
            (true, false, _) => Self::Room,
            (false, true, true) => Self::Stripped,
            _ => Self::Base,
        }
    }

    /// Lowercase name of the layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Stripped => "stripped",
            Self::Room => "room",
            Self::State => "state",
        }
    }
}

impl fmt::Display for EventLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded event of any layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyEvent<C> {
    /// Base envelope.
    Base(Event<C>),
    /// Stripped envelope.
    Stripped(StrippedEvent<C>),
    /// Room envelope.
    Room(RoomEvent<C>),
    /// State envelope.
    State(StateEvent<C>),
}

impl<C: EventContent> AnyEvent<C> {
    /// Decodes `obj` as the given layer.
    pub fn decode(layer: EventLayer, obj: &Value) -> Decoded<Self> {
        match layer {
            EventLayer::Base => Event::from_json(obj).map(Self::Base),
            EventLayer::Stripped => StrippedEvent::from_json(obj).map(Self::Stripped),
            EventLayer::Room => RoomEvent::from_json(obj).map(Self::Room),
            EventLayer::State => StateEvent::from_json(obj).map(Self::State),
        }
    }

    /// Detects the layer, then decodes.
    pub fn detect(obj: &Value) -> Decoded<Self> {
        Self::decode(EventLayer::detect(obj), obj)
    }

    /// The layer this event was decoded as.
    pub fn layer(&self) -> EventLayer {
        match self {
            Self::Base(_) => EventLayer::Base,
            Self::Stripped(_) => EventLayer::Stripped,
            Self::Room(_) => EventLayer::Room,
            Self::State(_) => EventLayer::State,
        }
    }

    /// The base envelope shared by every layer.
    pub fn base(&self) -> &Event<C> {
        match self {
            Self::Base(e) => e,
            Self::Stripped(e) => e,
            Self::Room(e) => e,
            Self::State(e) => e,
        }
    }

    /// Shorthand for `self.base().event_type`.
    pub fn event_type(&self) -> &EventType {
        &self.base().event_type
    }

    /// Encodes with the codec of the held layer.
    pub fn to_json(&self) -> EventResult<Value> {
        match self {
            Self::Base(e) => e.to_json(),
            Self::Stripped(e) => e.to_json(),
            Self::Room(e) => e.to_json(),
            Self::State(e) => e.to_json(),
        }
    }
}

/// Decodes every element independently.
///
/// The output has one entry per input, in order.
pub fn decode_batch<T: JsonCodec>(values: &[Value]) -> Vec<Decoded<T>> {
    let decoded: Vec<Decoded<T>> = values.iter().map(T::from_json).collect();
    let partial = decoded.iter().filter(|d| !d.is_complete()).count();
    debug!(
        entity = T::ENTITY,
        total = decoded.len(),
        partial,
        "Decoded event batch"
    );
    decoded
}
