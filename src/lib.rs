//! Message trace reporting for a messaging broker.
//!
//! Records publish and delivery-state events for individual messages so a
//! message's path (topic, offset, consumer, state, time) can be reconstructed
//! later. Events go to the local structured log, or to a remote trace
//! collector with local fallback.
//!
//! ```no_run
//! use msg_tracer::{BackendOffset, MessageRef, MsgTracer, SubState, Tracer, TracerGuard};
//!
//! let guard = TracerGuard::start(Tracer::configure("127.0.0.1:5140").into_shared());
//! let tracer = guard.tracer();
//!
//! let msg = MessageRef { id: "m1", offset: BackendOffset(1000), attempts: 1 };
//! tracer.trace_pub("orders", 42, &msg, BackendOffset(1000), 5);
//! tracer.trace_sub("orders", SubState::Fin, 42, &msg, "c1");
//!
//! guard.shutdown();
//! ```

// Core subsystems
pub mod trace;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::MsgTracerConfig;
pub use lifecycle::TracerGuard;
pub use trace::{
    BackendOffset, LocalTracer, MessageRef, MsgTracer, RemoteTracer, SharedTracer, SubState,
    TraceAction, TraceEvent, Tracer,
};
pub use transport::{CollectorClient, Transport, TransportError};
