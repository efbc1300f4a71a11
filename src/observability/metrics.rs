//! Metrics collection for trace recording.
//!
//! # Metrics
//! - `msgtracer_events_total` (counter): trace events recorded, by action and sink
//! - `msgtracer_remote_failures_total` (counter): failed collector sends, by reason
//! - `msgtracer_local_fallbacks_total` (counter): events recorded locally in remote mode
//!
//! # Design Decisions
//! - Uses the `metrics` facade only; installing an exporter is the host's job
//! - Updates are cheap enough for the publish path (no recorder installed = no-op)

use crate::trace::TraceAction;

/// Sink that recorded a trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Local,
    Remote,
}

impl Sink {
    fn as_str(&self) -> &'static str {
        match self {
            Sink::Local => "local",
            Sink::Remote => "remote",
        }
    }
}

/// Record one trace event written to `sink`.
pub fn record_event(action: TraceAction, sink: Sink) {
    metrics::counter!(
        "msgtracer_events_total",
        "action" => action.as_str(),
        "sink" => sink.as_str()
    )
    .increment(1);
}

/// Record a failed collector send.
pub fn record_remote_failure(reason: &'static str) {
    metrics::counter!("msgtracer_remote_failures_total", "reason" => reason).increment(1);
}

/// Record an event that remote mode also wrote to the local log.
pub fn record_local_fallback() {
    metrics::counter!("msgtracer_local_fallbacks_total").increment(1);
}
