//! Batch inspection of wire events.
//!
//! [`Inspector`] pulls the event list out of an input document, decodes every
//! event at the configured (or detected) layer and summarizes the outcome in an
//! [`InspectReport`].
//!
//! Accepted documents:
//!
//! - a JSON array of events
//! - an object with an `"events"` array
//! - a sync response: `state`, `timeline` and `invite_state` sections, either at
//!   the top level or nested under `rooms.{join,invite,leave}.<room_id>`

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use lattice_events::{AnyEvent, EventLayer, EventType, MessageType};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::InspectConfig;
use crate::error::{RuntimeError, RuntimeResult};

const SYNC_SECTIONS: &[&str] = &["state", "timeline", "invite_state"];
const SYNC_ROOM_KINDS: &[&str] = &["join", "invite", "leave"];

/// One violation found while inspecting a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationRecord {
    /// Position of the event in the extracted list.
    pub index: usize,
    /// Layer the event was decoded as.
    pub layer: EventLayer,
    /// Discriminant as it appeared on the wire.
    pub event_type: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ViolationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{} {}] {}",
            self.index, self.layer, self.event_type, self.message
        )
    }
}

/// Summary of one inspection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    /// Events examined.
    pub total: usize,
    /// Events decoded without violations.
    pub complete: usize,
    /// Events decoded with at least one violation.
    pub partial: usize,
    /// Event count per decoded layer.
    pub by_layer: BTreeMap<String, usize>,
    /// Event count per discriminant.
    pub by_type: BTreeMap<String, usize>,
    /// Message subtype count for `m.room.message` events.
    pub by_msgtype: BTreeMap<String, usize>,
    /// Complete events that were re-encoded and decoded again.
    pub round_trip_checked: usize,
    /// Round-trip checks that failed.
    pub round_trip_failures: usize,
    /// Violations, capped at `max_reported_violations`.
    pub violations: Vec<ViolationRecord>,
    /// Violations left out of the list because of the cap.
    pub truncated_violations: usize,
}

impl InspectReport {
    /// Returns `true` if any event was partial or failed its round trip.
    pub fn has_violations(&self) -> bool {
        self.partial > 0 || self.round_trip_failures > 0
    }

    fn record(&mut self, cap: usize, violation: ViolationRecord) {
        if self.violations.len() < cap {
            self.violations.push(violation);
        } else {
            self.truncated_violations += 1;
        }
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} events: {} complete, {} partial",
            self.total, self.complete, self.partial
        )?;
        if self.round_trip_checked > 0 {
            writeln!(
                f,
                "round trip: {} checked, {} failed",
                self.round_trip_checked, self.round_trip_failures
            )?;
        }

        for (title, counts) in [
            ("layers", &self.by_layer),
            ("types", &self.by_type),
            ("msgtypes", &self.by_msgtype),
        ] {
            if counts.is_empty() {
                continue;
            }
            writeln!(f, "{title}:")?;
            for (name, count) in counts {
                writeln!(f, "  {name:<32} {count}")?;
            }
        }

        if !self.violations.is_empty() {
            writeln!(f, "violations:")?;
            for violation in &self.violations {
                writeln!(f, "  {violation}")?;
            }
            if self.truncated_violations > 0 {
                writeln!(f, "  ... {} more", self.truncated_violations)?;
            }
        }
        Ok(())
    }
}

/// Pulls the event list out of a document.
///
/// Returns `None` if the document has none of the accepted shapes.
pub fn extract_events(doc: &Value) -> Option<Vec<&Value>> {
    match doc {
        Value::Array(events) => Some(events.iter().collect()),
        Value::Object(map) => {
            if let Some(Value::Array(events)) = map.get("events") {
                return Some(events.iter().collect());
            }
            let mut events = Vec::new();
            collect_sync(doc, &mut events).then_some(events)
        }
        _ => None,
    }
}

/// Appends every sync section found under `obj`. Returns `true` if any
/// section was present, even an empty one.
fn collect_sync<'a>(obj: &'a Value, out: &mut Vec<&'a Value>) -> bool {
    let mut found = false;

    for section in SYNC_SECTIONS {
        if let Some(Value::Array(events)) = obj.get(section).and_then(|s| s.get("events")) {
            out.extend(events);
            found = true;
        }
    }

    if let Some(rooms) = obj.get("rooms") {
        for kind in SYNC_ROOM_KINDS {
            let Some(Value::Object(by_id)) = rooms.get(kind) else {
                continue;
            };
            for room in by_id.values() {
                found |= collect_sync(room, out);
            }
        }
    }

    found
}

/// Decodes batches of events according to an [`InspectConfig`].
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    config: InspectConfig,
}

impl Inspector {
    /// Creates an inspector.
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Reads and inspects a JSON file.
    pub fn inspect_file(&self, path: impl AsRef<Path>) -> RuntimeResult<InspectReport> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        debug!(path = %path.display(), bytes = raw.len(), "Read input file");
        self.inspect_str(&raw)
    }

    /// Parses and inspects raw JSON text.
    pub fn inspect_str(&self, raw: &str) -> RuntimeResult<InspectReport> {
        let doc: Value = serde_json::from_str(raw)?;
        self.inspect_document(&doc)
    }

    /// Inspects a parsed document.
    pub fn inspect_document(&self, doc: &Value) -> RuntimeResult<InspectReport> {
        let events = extract_events(doc).ok_or(RuntimeError::UnrecognizedDocument)?;
        Ok(self.inspect_events(events))
    }

    /// Inspects a list of event objects.
    pub fn inspect_events<'a>(&self, events: impl IntoIterator<Item = &'a Value>) -> InspectReport {
        let cap = self.config.max_reported_violations;
        let mut report = InspectReport::default();

        for (index, obj) in events.into_iter().enumerate() {
            let layer = self.config.layer.layer_for(obj);
            let (event, violations) = AnyEvent::<Value>::decode(layer, obj).into_parts();
            let event_type = event.event_type().to_string();

            report.total += 1;
            *report.by_layer.entry(layer.to_string()).or_default() += 1;
            *report.by_type.entry(event_type.clone()).or_default() += 1;
            if *event.event_type() == EventType::RoomMessage {
                let msgtype = MessageType::from_content(&event.base().content);
                let name = msgtype.as_str().unwrap_or("unknown");
                *report.by_msgtype.entry(name.to_string()).or_default() += 1;
            }

            if violations.is_empty() {
                report.complete += 1;
            } else {
                report.partial += 1;
                for err in violations {
                    report.record(
                        cap,
                        ViolationRecord {
                            index,
                            layer,
                            event_type: event_type.clone(),
                            message: err.to_string(),
                        },
                    );
                }
                continue;
            }

            if self.config.verify_round_trip {
                report.round_trip_checked += 1;
                if let Err(message) = verify_round_trip(&event) {
                    warn!(index, %layer, event_type = %event_type, %message, "Round trip failed");
                    report.round_trip_failures += 1;
                    report.record(
                        cap,
                        ViolationRecord {
                            index,
                            layer,
                            event_type,
                            message,
                        },
                    );
                }
            }
        }

        info!(
            total = report.total,
            complete = report.complete,
            partial = report.partial,
            round_trip_failures = report.round_trip_failures,
            "Inspection finished"
        );
        report
    }
}

/// Re-encodes `event` and checks that decoding the result gives it back.
fn verify_round_trip(event: &AnyEvent<Value>) -> Result<(), String> {
    let encoded = event
        .to_json()
        .map_err(|e| format!("re-encode failed: {e}"))?;
    let again = AnyEvent::<Value>::decode(event.layer(), &encoded);
    if let Some(err) = again.violations().first() {
        return Err(format!("re-decode failed: {err}"));
    }
    if again.value() != event {
        return Err("re-decoded event differs from the original".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerSelection;
    use serde_json::json;

    fn topic_state() -> Value {
        json!({
            "content": {"topic": "Rust"},
            "type": "m.room.topic",
            "event_id": "$topic:example.org",
            "sender": "@alice:example.org",
            "origin_server_ts": 1432735824653u64,
            "state_key": ""
        })
    }

    fn text_message() -> Value {
        json!({
            "content": {"body": "hello", "msgtype": "m.text"},
            "type": "m.room.message",
            "event_id": "$msg:example.org",
            "room_id": "!room:example.org",
            "sender": "@alice:example.org",
            "origin_server_ts": 1432735824654u64
        })
    }

    #[test]
    fn test_extract_shapes() {
        let array = json!([topic_state(), text_message()]);
        assert_eq!(extract_events(&array).map(|e| e.len()), Some(2));

        let wrapped = json!({"events": [text_message()]});
        assert_eq!(extract_events(&wrapped).map(|e| e.len()), Some(1));

        let flat_sync = json!({
            "state": {"events": [topic_state()]},
            "timeline": {"events": [text_message(), text_message()]}
        });
        assert_eq!(extract_events(&flat_sync).map(|e| e.len()), Some(3));

        let nested_sync = json!({
            "next_batch": "s72595_4483_1934",
            "rooms": {
                "join": {
                    "!room:example.org": {
                        "state": {"events": [topic_state()]},
                        "timeline": {"events": [text_message()]}
                    }
                },
                "invite": {
                    "!other:example.org": {
                        "invite_state": {"events": [{
                            "content": {"name": "Other"},
                            "type": "m.room.name",
                            "sender": "@bob:example.org",
                            "state_key": ""
                        }]}
                    }
                }
            }
        });
        assert_eq!(extract_events(&nested_sync).map(|e| e.len()), Some(3));

        let empty_sync = json!({"timeline": {"events": []}});
        assert_eq!(extract_events(&empty_sync).map(|e| e.len()), Some(0));

        assert!(extract_events(&json!({"foo": 1})).is_none());
        assert!(extract_events(&json!("text")).is_none());
    }

    #[test]
    fn test_inspect_counts() {
        let doc = json!([
            topic_state(),
            text_message(),
            {"content": {"body": "x", "msgtype": "m.notice"}, "type": "m.room.message"},
            {"content": {}, "type": "org.example.custom"}
        ]);
        let report = Inspector::default().inspect_document(&doc).unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.complete, 4);
        assert!(!report.has_violations());
        assert_eq!(report.by_layer["state"], 1);
        assert_eq!(report.by_layer["room"], 1);
        assert_eq!(report.by_layer["base"], 2);
        assert_eq!(report.by_type["m.room.message"], 2);
        assert_eq!(report.by_type["org.example.custom"], 1);
        assert_eq!(report.by_msgtype["m.text"], 1);
        assert_eq!(report.by_msgtype["m.notice"], 1);
        assert_eq!(report.round_trip_checked, 4);
        assert_eq!(report.round_trip_failures, 0);
    }

    #[test]
    fn test_forced_layer_reports_missing_fields() {
        let config = InspectConfig {
            layer: LayerSelection::State,
            ..Default::default()
        };
        let doc = json!([text_message()]);
        let report = Inspector::new(config).inspect_document(&doc).unwrap();

        assert_eq!(report.partial, 1);
        assert!(report.has_violations());
        assert_eq!(report.round_trip_checked, 0);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].index, 0);
        assert_eq!(report.violations[0].layer, EventLayer::State);
        assert!(report.violations[0].message.contains("state_key"));
    }

    #[test]
    fn test_violation_cap() {
        let config = InspectConfig {
            max_reported_violations: 2,
            ..Default::default()
        };
        let doc = json!([{"type": "m.room.name"}, "oops", {"content": {}}, 42]);
        let report = Inspector::new(config).inspect_document(&doc).unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.partial, 4);
        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.truncated_violations, 2);
    }

    #[test]
    fn test_lossy_round_trip_is_reported() {
        let mut message = text_message();
        message["room_id"] = json!("");
        let report = Inspector::default()
            .inspect_document(&json!([message]))
            .unwrap();

        assert_eq!(report.complete, 1);
        assert_eq!(report.round_trip_failures, 1);
        assert!(report.has_violations());
    }

    #[test]
    fn test_round_trip_can_be_disabled() {
        let config = InspectConfig {
            verify_round_trip: false,
            ..Default::default()
        };
        let report = Inspector::new(config)
            .inspect_document(&json!([topic_state()]))
            .unwrap();
        assert_eq!(report.round_trip_checked, 0);
    }

    #[test]
    fn test_inspect_str_errors() {
        let inspector = Inspector::default();
        assert!(matches!(
            inspector.inspect_str("{not json"),
            Err(RuntimeError::Json(_))
        ));
        assert!(matches!(
            inspector.inspect_str(r#"{"foo": 1}"#),
            Err(RuntimeError::UnrecognizedDocument)
        ));
    }

    #[test]
    fn test_report_text() {
        let report = Inspector::default()
            .inspect_document(&json!([text_message(), {"type": "m.room.name"}]))
            .unwrap();
        let text = report.to_string();
        assert!(text.starts_with("2 events: 1 complete, 1 partial"));
        assert!(text.contains("m.room.message"));
        assert!(text.contains("#1 [base <unsupported>]"));
        assert!(text.contains("missing required field 'content'"));
    }

    #[test]
    fn test_report_serializes() {
        let report = Inspector::default()
            .inspect_document(&json!([topic_state()]))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["by_layer"]["state"], 1);
    }
}
