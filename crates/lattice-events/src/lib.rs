//! # Lattice Events
//!
//! Typed envelopes for the JSON events of a Matrix-style chat protocol.
//!
//! ## Event Hierarchy
//!
//! Envelopes are layered by composition. Each child embeds its parent in a
//! `parent` field and `Deref`s to it:
//!
//! ```text
//! Event<C> { content, event_type }
//! ├── StrippedEvent<C> { sender, state_key }
//! └── RoomEvent<C> { event_id, room_id, sender, origin_server_ts, unsigned_data }
//!     └── StateEvent<C> { state_key, prev_content }
//! ```
//!
//! `C` is the content payload: any type implementing
//! `Default + Serialize + DeserializeOwned`.
//!
//! ## Fail-Soft Decoding
//!
//! Decoders never abort. A missing required field halts the current layer
//! only, and a content codec failure leaves `content` at its default. The
//! [`Decoded`] outcome says which of those happened:
//!
//! ```rust
//! use lattice_events::{EventType, JsonCodec, RoomEvent};
//! use serde_json::{Value, json};
//!
//! let decoded = RoomEvent::<Value>::from_json(&json!({
//!     "content": {"body": "hi", "msgtype": "m.text"},
//!     "type": "m.room.message",
//!     "sender": "@alice:example.org",
//!     "origin_server_ts": 1609459200000.0
//! }));
//!
//! assert!(!decoded.is_complete()); // no event_id
//! assert_eq!(decoded.value().event_type, EventType::RoomMessage);
//! ```
//!
//! ## Encoding
//!
//! [`JsonCodec::to_json`] mirrors decoding, building the parent object first
//! and adding each layer's keys on top. Events of an unknown type keep their
//! raw `type` string and encode it back unchanged.

pub mod batch;
pub mod codec;
pub mod content;
pub mod error;
pub mod event;
pub mod msgtype;
pub mod outcome;
pub mod room;
pub mod state;
pub mod stripped;
pub mod types;
pub mod unsigned;

pub use batch::{AnyEvent, EventLayer, decode_batch};
pub use codec::{EmitPolicy, EventContent, JsonCodec};
pub use error::{EventError, EventResult};
pub use event::Event;
pub use msgtype::MessageType;
pub use outcome::Decoded;
pub use room::RoomEvent;
pub use state::StateEvent;
pub use stripped::StrippedEvent;
pub use types::EventType;
pub use unsigned::{UNSIGNED_FIELD_POLICY, UnsignedData};
