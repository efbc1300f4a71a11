//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → init logging → Tracer::from_config → TracerGuard::start
//!     → hand SharedTracer to broker call sites
//!
//! Shutdown:
//!     Broker stops traffic → TracerGuard::shutdown (or drop) → tracer.stop()
//! ```
//!
//! # Design Decisions
//! - The tracer is started before any publish/consume traffic
//! - Stop runs exactly once, even if shutdown is called and the guard is dropped

pub mod shutdown;

pub use shutdown::TracerGuard;
