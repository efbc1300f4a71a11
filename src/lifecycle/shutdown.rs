//! Tracer start/stop coordination for the broker process.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::trace::{MsgTracer, SharedTracer};

/// Owns the start/stop discipline of the process's tracer.
///
/// Starts the tracer on creation and stops it exactly once, on
/// [`TracerGuard::shutdown`] or when dropped.
pub struct TracerGuard {
    tracer: SharedTracer,
    stopped: AtomicBool,
}

impl TracerGuard {
    /// Start `tracer` and take over its shutdown.
    pub fn start(tracer: SharedTracer) -> Self {
        tracer.start();
        Self {
            tracer,
            stopped: AtomicBool::new(false),
        }
    }

    /// Handle for broker call sites.
    pub fn tracer(&self) -> SharedTracer {
        SharedTracer::clone(&self.tracer)
    }

    /// Stop the tracer. Later calls and the drop are no-ops.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!(remote = self.tracer.is_remote(), "Stopping message tracer");
        self.tracer.stop();
    }
}

impl Drop for TracerGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}
