//! Local recorder: trace events as lines in the process's own log stream.

use crate::observability::metrics::{self, Sink};
use crate::trace::event::{BackendOffset, MessageRef, SubState, TraceEvent};
use crate::trace::selector::MsgTracer;
use crate::trace::TRACE_TARGET;

/// Writes every trace event to the `msgtracer` log target.
///
/// Has no network dependency, so it is always safe as a fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTracer;

impl LocalTracer {
    pub fn new() -> Self {
        Self
    }

    /// Write one log line for `event`.
    pub fn record(&self, event: &TraceEvent<'_>) {
        if event.is_publish() {
            tracing::info!(
                target: TRACE_TARGET,
                topic = event.topic(),
                trace_id = event.trace_id(),
                msg_id = event.message_id(),
                offset = event.offset().0,
                action = event.action().as_str(),
                current_count = event.current_count(),
                "{}",
                event
            );
        } else {
            tracing::info!(
                target: TRACE_TARGET,
                topic = event.topic(),
                trace_id = event.trace_id(),
                msg_id = event.message_id(),
                offset = event.offset().0,
                action = event.action().as_str(),
                client_id = event.client_id(),
                attempt = event.attempts(),
                "{}",
                event
            );
        }
        metrics::record_event(event.action(), Sink::Local);
    }
}

impl MsgTracer for LocalTracer {
    fn start(&self) {}

    fn trace_pub(
        &self,
        topic: &str,
        trace_id: u64,
        msg: &MessageRef<'_>,
        disk_offset: BackendOffset,
        current_count: i64,
    ) {
        self.record(&TraceEvent::publish(topic, trace_id, msg, disk_offset, current_count));
    }

    fn trace_sub(
        &self,
        topic: &str,
        state: SubState,
        trace_id: u64,
        msg: &MessageRef<'_>,
        client_id: &str,
    ) {
        self.record(&TraceEvent::subscribe(topic, state, trace_id, msg, client_id));
    }
}
