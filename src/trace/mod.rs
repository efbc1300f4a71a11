//! Message trace subsystem.
//!
//! # Data Flow
//! ```text
//! broker publish path   → SharedTracer.trace_pub(..)
//! broker delivery path  → SharedTracer.trace_sub(..)
//!     → selector.rs (Tracer: Local or Remote, chosen at startup)
//!     → event.rs (TraceEvent stamped with recording time)
//!     → local.rs  (one log line on target `msgtracer`)
//!     → remote.rs (collector record, falls back to local.rs)
//! ```
//!
//! # Design Decisions
//! - Recording is synchronous and inline; no worker, no queue
//! - Nothing here returns an error to the broker
//! - Duplicates between the local log and the collector are expected

pub mod event;
pub mod local;
pub mod remote;
pub mod selector;

pub use event::{BackendOffset, MessageRef, SubState, TraceAction, TraceEvent};
pub use local::LocalTracer;
pub use remote::RemoteTracer;
pub use selector::{MsgTracer, SharedTracer, Tracer};

/// Log target and collector module name for trace records.
pub const TRACE_TARGET: &str = "msgtracer";
