//! `m.room.create` content.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Content of the event that creates a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Create {
    /// User id of the room creator.
    pub creator: String,
    /// Whether users on other servers may join.
    #[serde(rename = "m.federate")]
    pub federate: bool,
}

impl Default for Create {
    fn default() -> Self {
        Self {
            creator: String::new(),
            federate: true,
        }
    }
}

#[derive(Deserialize)]
struct RawCreate {
    creator: Option<String>,
    #[serde(rename = "m.federate")]
    federate: Option<bool>,
}

impl<'de> Deserialize<'de> for Create {
    /// Without a `creator` the payload is left at its default rather than
    /// rejected, so the surrounding event still decodes.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawCreate::deserialize(deserializer)?;
        let Some(creator) = raw.creator else {
            debug!("m.room.create content has no creator");
            return Ok(Self::default());
        };
        Ok(Self {
            creator,
            federate: raw.federate.unwrap_or(true),
        })
    }
}
