//! Records sent to the trace collector.
//!
//! One record per trace call, encoded as one JSON object per line:
//!
//! ```text
//! {"level":"info","app":"broker","module":"msgtracer","message":"[TRACE] ...",
//!  "detail":{"msgid":"m1","traceid":42,"topic":"orders","timestamp":1700000000000000000,"action":"PUB"}}
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::trace::TraceEvent;

/// Ordered key/value fields attached to a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailInfo {
    items: Vec<(&'static str, Value)>,
}

impl DetailInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, key: &'static str, value: impl Into<Value>) -> &mut Self {
        self.items.push((key, value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.items.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for DetailInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One logical message for the collector.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LogRecord<'a> {
    pub level: &'static str,
    pub app: &'a str,
    pub module: &'a str,
    pub message: String,
    pub detail: DetailInfo,
}

impl<'a> LogRecord<'a> {
    /// Info-level record for `module`.
    pub fn info(app: &'a str, module: &'a str, message: String, detail: DetailInfo) -> Self {
        Self {
            level: "info",
            app,
            module,
            message,
            detail,
        }
    }

    /// Record for a trace event: the five correlation fields plus the summary line.
    pub fn for_event(app: &'a str, module: &'a str, event: &TraceEvent<'_>) -> Self {
        let mut detail = DetailInfo::new();
        detail
            .add_item("msgid", event.message_id())
            .add_item("traceid", event.trace_id())
            .add_item("topic", event.topic())
            .add_item("timestamp", event.timestamp())
            .add_item("action", event.action().as_str());
        Self::info(app, module, event.to_string(), detail)
    }

    /// Encode as a single newline-terminated JSON line.
    pub fn encode_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{BackendOffset, MessageRef, SubState};

    fn message() -> MessageRef<'static> {
        MessageRef {
            id: "m1",
            offset: BackendOffset(1000),
            attempts: 2,
        }
    }

    #[test]
    fn event_record_has_correlation_fields() {
        let event = TraceEvent::subscribe("orders", SubState::Req, 42, &message(), "c1");
        let record = LogRecord::for_event("broker", "msgtracer", &event);

        assert_eq!(record.detail.len(), 5);
        assert_eq!(record.detail.get("msgid"), Some(&Value::from("m1")));
        assert_eq!(record.detail.get("traceid"), Some(&Value::from(42u64)));
        assert_eq!(record.detail.get("topic"), Some(&Value::from("orders")));
        assert_eq!(record.detail.get("timestamp"), Some(&Value::from(event.timestamp())));
        assert_eq!(record.detail.get("action"), Some(&Value::from("REQ")));
        assert_eq!(record.message, event.to_string());
    }

    #[test]
    fn encodes_one_json_line_with_ordered_detail() {
        let event = TraceEvent::publish("orders", 42, &message(), BackendOffset(1000), 5);
        let line = LogRecord::for_event("broker", "msgtracer", &event)
            .encode_line()
            .unwrap();

        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|b| **b == b'\n').count(), 1);

        let text = String::from_utf8(line).unwrap();
        let msgid = text.find("\"msgid\"").unwrap();
        let action = text.find("\"action\"").unwrap();
        assert!(msgid < action);

        let parsed: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["module"], "msgtracer");
        assert_eq!(parsed["detail"]["action"], "PUB");
    }
}
