//! Event type discriminant.
//!
//! Maps the canonical `type` strings of the protocol onto [`EventType`] and
//! back. Matching is exact and case-sensitive; anything outside the table
//! resolves to [`EventType::Unsupported`], which keeps the raw string so the
//! event can be re-encoded unchanged.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::trace;

/// Semantic kind of an event, paired with its canonical wire string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `m.room.aliases`
    RoomAliases,
    /// `m.room.avatar`
    RoomAvatar,
    /// `m.room.canonical_alias`
    RoomCanonicalAlias,
    /// `m.room.create`
    RoomCreate,
    /// `m.room.guest_access`
    RoomGuestAccess,
    /// `m.room.history_visibility`
    RoomHistoryVisibility,
    /// `m.room.join_rules`
    RoomJoinRules,
    /// `m.room.member`
    RoomMember,
    /// `m.room.message`
    RoomMessage,
    /// `m.room.name`
    RoomName,
    /// `m.room.power_levels`
    RoomPowerLevels,
    /// `m.room.topic`
    RoomTopic,
    /// `m.room.redaction`
    RoomRedaction,
    /// `m.room.pinned_events`
    RoomPinnedEvents,
    /// Any other type string, kept verbatim.
    ///
    /// Empty when the `type` field was absent or not a string; such a value
    /// cannot be encoded.
    Unsupported(String),
}

impl EventType {
    /// Every supported tag, in table order.
    pub const ALL: [EventType; 14] = [
        EventType::RoomAliases,
        EventType::RoomAvatar,
        EventType::RoomCanonicalAlias,
        EventType::RoomCreate,
        EventType::RoomGuestAccess,
        EventType::RoomHistoryVisibility,
        EventType::RoomJoinRules,
        EventType::RoomMember,
        EventType::RoomMessage,
        EventType::RoomName,
        EventType::RoomPowerLevels,
        EventType::RoomTopic,
        EventType::RoomRedaction,
        EventType::RoomPinnedEvents,
    ];

    /// Resolves a wire string to its tag.
    pub fn resolve(s: &str) -> Self {
        match s {
            "m.room.aliases" => Self::RoomAliases,
            "m.room.avatar" => Self::RoomAvatar,
            "m.room.canonical_alias" => Self::RoomCanonicalAlias,
            "m.room.create" => Self::RoomCreate,
            "m.room.guest_access" => Self::RoomGuestAccess,
            "m.room.history_visibility" => Self::RoomHistoryVisibility,
            "m.room.join_rules" => Self::RoomJoinRules,
            "m.room.member" => Self::RoomMember,
            "m.room.message" => Self::RoomMessage,
            "m.room.name" => Self::RoomName,
            "m.room.power_levels" => Self::RoomPowerLevels,
            "m.room.topic" => Self::RoomTopic,
            "m.room.redaction" => Self::RoomRedaction,
            "m.room.pinned_events" => Self::RoomPinnedEvents,
            other => {
                trace!(event_type = other, "Unrecognized event type");
                Self::Unsupported(other.to_string())
            }
        }
    }

    /// Resolves the `type` field of an event object.
    ///
    /// A missing or non-string `type` yields an empty [`EventType::Unsupported`].
    pub fn resolve_object(obj: &Value) -> Self {
        match obj.get("type").and_then(Value::as_str) {
            Some(s) => Self::resolve(s),
            None => Self::Unsupported(String::new()),
        }
    }

    /// Returns the wire string, or `None` if there is nothing to write.
    pub fn render(&self) -> Option<&str> {
        let s = self.as_str();
        (!s.is_empty()).then_some(s)
    }

    /// Returns the wire string; empty for a bare `Unsupported`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::RoomAliases => "m.room.aliases",
            Self::RoomAvatar => "m.room.avatar",
            Self::RoomCanonicalAlias => "m.room.canonical_alias",
            Self::RoomCreate => "m.room.create",
            Self::RoomGuestAccess => "m.room.guest_access",
            Self::RoomHistoryVisibility => "m.room.history_visibility",
            Self::RoomJoinRules => "m.room.join_rules",
            Self::RoomMember => "m.room.member",
            Self::RoomMessage => "m.room.message",
            Self::RoomName => "m.room.name",
            Self::RoomPowerLevels => "m.room.power_levels",
            Self::RoomTopic => "m.room.topic",
            Self::RoomRedaction => "m.room.redaction",
            Self::RoomPinnedEvents => "m.room.pinned_events",
            Self::Unsupported(raw) => raw,
        }
    }

    /// Returns `true` for every tag in the table.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::Unsupported(String::new())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(raw) if raw.is_empty() => f.write_str("<unsupported>"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for EventType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::resolve(s))
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        Self::resolve(s)
    }
}

impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.render() {
            Some(s) => serializer.serialize_str(s),
            None => Err(serde::ser::Error::custom(
                crate::error::EventError::UnrenderableType,
            )),
        }
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::resolve(&s))
    }
}
