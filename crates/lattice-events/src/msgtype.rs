//! Message subtype of `m.room.message` content.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// The `msgtype` of a room message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageType {
    /// `m.audio`
    Audio,
    /// `m.emote`
    Emote,
    /// `m.file`
    File,
    /// `m.image`
    Image,
    /// `m.location`
    Location,
    /// `m.notice`
    Notice,
    /// `m.text`
    Text,
    /// `m.video`
    Video,
    /// Absent or unrecognized.
    #[default]
    Unknown,
}

impl MessageType {
    /// Resolves a `msgtype` string.
    pub fn resolve(s: &str) -> Self {
        match s {
            "m.audio" => Self::Audio,
            "m.emote" => Self::Emote,
            "m.file" => Self::File,
            "m.image" => Self::Image,
            "m.location" => Self::Location,
            "m.notice" => Self::Notice,
            "m.text" => Self::Text,
            "m.video" => Self::Video,
            _ => Self::Unknown,
        }
    }

    /// Reads the `msgtype` key of a message content object.
    pub fn from_content(content: &Value) -> Self {
        content
            .get("msgtype")
            .and_then(Value::as_str)
            .map_or(Self::Unknown, Self::resolve)
    }

    /// Returns the wire string, or `None` for [`MessageType::Unknown`].
    pub fn as_str(self) -> Option<&'static str> {
        Some(match self {
            Self::Audio => "m.audio",
            Self::Emote => "m.emote",
            Self::File => "m.file",
            Self::Image => "m.image",
            Self::Location => "m.location",
            Self::Notice => "m.notice",
            Self::Text => "m.text",
            Self::Video => "m.video",
            Self::Unknown => return None,
        })
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("unknown"))
    }
}

impl FromStr for MessageType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::resolve(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_inverse() {
        for tag in [
            MessageType::Audio,
            MessageType::Emote,
            MessageType::File,
            MessageType::Image,
            MessageType::Location,
            MessageType::Notice,
            MessageType::Text,
            MessageType::Video,
        ] {
            assert_eq!(MessageType::resolve(tag.as_str().unwrap()), tag);
        }
        assert_eq!(MessageType::Unknown.as_str(), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("m.emote".parse::<MessageType>(), Ok(MessageType::Emote));
        assert_eq!("m.poll".parse::<MessageType>(), Ok(MessageType::Unknown));
    }

    #[test]
    fn test_from_content() {
        assert_eq!(
            MessageType::from_content(&json!({"msgtype": "m.notice", "body": "hi"})),
            MessageType::Notice
        );
        assert_eq!(
            MessageType::from_content(&json!({"body": "hi"})),
            MessageType::Unknown
        );
        assert_eq!(
            MessageType::from_content(&json!({"msgtype": "org.example.poll"})),
            MessageType::Unknown
        );
    }
}
