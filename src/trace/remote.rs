//! Remote recorder: forwards trace events to a trace collector.
//!
//! # Fallback rule
//! ```text
//! send record once
//!     → failed?          warn "send log to remote error" + record locally
//!     → debug enabled?   record locally
//!     → otherwise        nothing local
//! ```
//!
//! The debug check is live: it asks the current subscriber on every call, so
//! raising `msgtracer=debug` at runtime takes effect immediately.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Level;

use crate::observability::metrics::{self, Sink};
use crate::trace::event::{BackendOffset, MessageRef, SubState, TraceEvent};
use crate::trace::local::LocalTracer;
use crate::trace::selector::MsgTracer;
use crate::trace::TRACE_TARGET;
use crate::transport::{CollectorClient, LogRecord, Transport};

/// Best-effort collector forwarding with guaranteed local visibility.
pub struct RemoteTracer<T: Transport = CollectorClient> {
    transport: T,
    local: LocalTracer,
    stopped: AtomicBool,
}

impl<T: Transport> RemoteTracer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            local: LocalTracer::new(),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Send `event` to the collector, then apply the fallback rule.
    pub fn record(&self, event: &TraceEvent<'_>) {
        let record = LogRecord::for_event(self.transport.app(), TRACE_TARGET, event);

        let send_failed = match self.transport.send(&record) {
            Ok(()) => {
                metrics::record_event(event.action(), Sink::Remote);
                false
            }
            Err(e) => {
                metrics::record_remote_failure(e.reason());
                tracing::warn!(error = %e, "send log to remote error");
                true
            }
        };

        if send_failed || debug_enabled() {
            metrics::record_local_fallback();
            self.local.record(event);
        }
    }
}

fn debug_enabled() -> bool {
    tracing::enabled!(target: TRACE_TARGET, Level::DEBUG)
}

impl<T: Transport> MsgTracer for RemoteTracer<T> {
    fn start(&self) {
        self.local.start();
        self.transport.start();
        tracing::info!(app = self.transport.app(), "Remote message tracer started");
    }

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

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            tracing::debug!("Remote message tracer already stopped");
            return;
        }
        self.transport.stop();
        tracing::info!("Remote message tracer stopped");
    }
}
