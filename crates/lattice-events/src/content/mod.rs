//! Concrete content payloads.
//!
//! Envelopes accept any [`EventContent`](crate::EventContent); the types here
//! cover payloads this crate needs to understand itself. Use
//! `serde_json::Value` for anything else.

pub mod create;

pub use create::Create;
