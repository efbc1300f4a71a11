//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Record to collector:
//!     → transport client enforces connect/write timeouts
//!     → On failure: backoff.rs opens a reconnect window
//!     → Sends inside the window fail fast; the recorder falls back to local
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every collector call has a deadline
//! - No retries of individual records; each is attempted at most once

pub mod backoff;
