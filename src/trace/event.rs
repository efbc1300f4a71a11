//! Trace event model.
//!
//! # Responsibilities
//! - Describe what happened to which message (publish or delivery state change)
//! - Stamp every event with its recording time
//! - Render the human-readable summary line shared by all recorders
//!
//! # Design Decisions
//! - Events borrow the broker's data; recorders cannot mutate it
//! - No validation of identifiers: the broker owns those invariants
//! - Events are never buffered or retried; one lives for one recording call

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Position of a message in its topic's backing log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BackendOffset(pub i64);

impl From<i64> for BackendOffset {
    fn from(offset: i64) -> Self {
        Self(offset)
    }
}

impl fmt::Display for BackendOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The broker's view of one stored message, as seen by a recorder.
///
/// The trace id is not part of it: callers pass it to every trace call, so a
/// redelivered message can be recorded under the id of the current trace.
#[derive(Debug, Clone, Copy)]
pub struct MessageRef<'a> {
    /// System-assigned id of the physical stored message.
    pub id: &'a str,
    /// Offset the message was stored at.
    pub offset: BackendOffset,
    /// Delivery attempts so far.
    pub attempts: u32,
}

/// Delivery lifecycle state reported by the consume path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubState {
    /// Read from the backing queue, waiting for a consumer.
    ReadQueue,
    /// Delivery to a client started.
    Start,
    /// Requeued by the client.
    Req,
    /// Finished by the client.
    Fin,
    /// Delivery timed out.
    Timeout,
}

impl SubState {
    pub const ALL: [SubState; 5] = [
        SubState::ReadQueue,
        SubState::Start,
        SubState::Req,
        SubState::Fin,
        SubState::Timeout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubState::ReadQueue => "READ_QUEUE",
            SubState::Start => "START",
            SubState::Req => "REQ",
            SubState::Fin => "FIN",
            SubState::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a state name is not one of the delivery states.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown consume state '{0}'")]
pub struct UnknownSubState(pub String);

impl FromStr for SubState {
    type Err = UnknownSubState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSubState(s.to_string()))
    }
}

/// What a trace event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceAction {
    /// Message appended to a topic.
    Pub,
    /// Message moved to a delivery state.
    Sub(SubState),
}

impl TraceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceAction::Pub => "PUB",
            TraceAction::Sub(state) => state.as_str(),
        }
    }
}

impl fmt::Display for TraceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nanoseconds since the Unix epoch, taken from the wall clock.
pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// One observation of a message's path through the broker.
///
/// Only [`TraceEvent::publish`] and [`TraceEvent::subscribe`] build events, and
/// both stamp `timestamp` themselves, so it always reflects recording time.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a> {
    topic: &'a str,
    trace_id: u64,
    message_id: &'a str,
    offset: BackendOffset,
    attempts: u32,
    action: TraceAction,
    client_id: &'a str,
    current_count: i64,
    timestamp: i64,
}

impl<'a> TraceEvent<'a> {
    /// Event for a message durably appended at `disk_offset`.
    pub fn publish(
        topic: &'a str,
        trace_id: u64,
        msg: &MessageRef<'a>,
        disk_offset: BackendOffset,
        current_count: i64,
    ) -> Self {
        Self {
            topic,
            trace_id,
            message_id: msg.id,
            offset: disk_offset,
            attempts: msg.attempts,
            action: TraceAction::Pub,
            client_id: "",
            current_count,
            timestamp: now_nanos(),
        }
    }

    /// Event for a message moving to `state` while delivered to `client_id`.
    pub fn subscribe(
        topic: &'a str,
        state: SubState,
        trace_id: u64,
        msg: &MessageRef<'a>,
        client_id: &'a str,
    ) -> Self {
        Self {
            topic,
            trace_id,
            message_id: msg.id,
            offset: msg.offset,
            attempts: msg.attempts,
            action: TraceAction::Sub(state),
            client_id,
            current_count: 0,
            timestamp: now_nanos(),
        }
    }

    pub fn topic(&self) -> &'a str {
        self.topic
    }

    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    pub fn message_id(&self) -> &'a str {
        self.message_id
    }

    pub fn offset(&self) -> BackendOffset {
        self.offset
    }

    /// Delivery attempts; only meaningful for subscribe events.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn action(&self) -> TraceAction {
        self.action
    }

    /// Consuming client; empty for publish events.
    pub fn client_id(&self) -> &'a str {
        self.client_id
    }

    /// Topic message count after the append; zero for subscribe events.
    pub fn current_count(&self) -> i64 {
        self.current_count
    }

    /// Recording time in nanoseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn is_publish(&self) -> bool {
        self.action == TraceAction::Pub
    }
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            TraceAction::Pub => write!(
                f,
                "[TRACE] topic={} trace_id={}: message {} put at offset {}, current count {} at time {}",
                self.topic, self.trace_id, self.message_id, self.offset, self.current_count, self.timestamp
            ),
            TraceAction::Sub(state) => write!(
                f,
                "[TRACE] topic={} trace_id={}: message {} (offset {}) consume state {} from client {} at time {}, attempt {}",
                self.topic,
                self.trace_id,
                self.message_id,
                self.offset,
                state,
                self.client_id,
                self.timestamp,
                self.attempts
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> MessageRef<'static> {
        MessageRef {
            id: "m1",
            offset: BackendOffset(1000),
            attempts: 2,
        }
    }

    #[test]
    fn publish_summary_carries_all_fields() {
        let event = TraceEvent::publish("orders", 42, &message(), BackendOffset(1000), 5);
        let line = event.to_string();

        assert!(line.starts_with("[TRACE] topic=orders trace_id=42: message m1 put at offset 1000"));
        assert!(line.contains("current count 5"));
        assert!(line.contains(&format!("at time {}", event.timestamp())));
        assert_eq!(event.client_id(), "");
    }

    #[test]
    fn subscribe_summary_carries_all_fields() {
        let event = TraceEvent::subscribe("orders", SubState::Fin, 42, &message(), "c1");
        let line = event.to_string();

        assert!(line.contains("topic=orders trace_id=42: message m1 (offset 1000)"));
        assert!(line.contains("consume state FIN from client c1"));
        assert!(line.ends_with(", attempt 2"));
        assert_eq!(event.current_count(), 0);
    }

    #[test]
    fn publish_uses_disk_offset_not_message_offset() {
        let event = TraceEvent::publish("orders", 42, &message(), BackendOffset(2048), 6);
        assert_eq!(event.offset(), BackendOffset(2048));
    }

    #[test]
    fn timestamp_is_taken_at_recording_time() {
        let before = now_nanos();
        let event = TraceEvent::subscribe("orders", SubState::Start, 1, &message(), "c1");
        let after = now_nanos();

        assert!(event.timestamp() >= before);
        assert!(event.timestamp() <= after);
    }

    #[test]
    fn sub_state_names_round_trip() {
        for state in SubState::ALL {
            assert_eq!(state.as_str().parse::<SubState>(), Ok(state));
        }
        assert_eq!("fin".parse::<SubState>(), Ok(SubState::Fin));
        assert_eq!("read_queue".parse::<SubState>(), Ok(SubState::ReadQueue));
        assert!("DONE".parse::<SubState>().is_err());
    }

    #[test]
    fn trace_id_comes_from_the_call() {
        let msg = message();
        let first = TraceEvent::subscribe("orders", SubState::Req, 42, &msg, "c1");
        let second = TraceEvent::subscribe("orders", SubState::Start, 43, &msg, "c2");

        assert_eq!(first.trace_id(), 42);
        assert_eq!(second.trace_id(), 43);
        assert!(second.to_string().contains("trace_id=43: message m1"));
    }

    #[test]
    fn action_names() {
        assert_eq!(TraceAction::Pub.as_str(), "PUB");
        assert_eq!(TraceAction::Sub(SubState::Timeout).as_str(), "TIMEOUT");
    }
}
