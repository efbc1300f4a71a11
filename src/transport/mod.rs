//! Collector transport subsystem.
//!
//! # Data Flow
//! ```text
//! RemoteTracer
//!     → record.rs (LogRecord: summary line + detail fields)
//!     → client.rs (JSON line over TCP, cached lookup, lazy connect, reconnect backoff)
//!     → trace collector
//! ```
//!
//! # Design Decisions
//! - The recorder only sees the `Transport` trait; tests swap in scripted transports
//! - Every failure is a `TransportError` value, never a panic

pub mod client;
pub mod record;

use std::time::Duration;

pub use client::{CollectorClient, Resolver};
pub use record::{DetailInfo, LogRecord};

/// Errors from sending a record to the collector.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The collector address could not be resolved.
    #[error("invalid collector address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The address lookup could not run or did not answer in time.
    #[error("resolving {addr} failed: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// No connection could be established.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the record failed; the connection was dropped.
    #[error("write to {addr} failed: {source}")]
    Write {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// A previous failure put the client in its reconnect window.
    #[error("collector unavailable, reconnect in {retry_in:?}")]
    Backoff { retry_in: Duration },

    /// The transport has been stopped.
    #[error("transport stopped")]
    Stopped,
}

impl TransportError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            TransportError::InvalidAddress { .. } => "invalid_address",
            TransportError::Resolve { .. } => "resolve",
            TransportError::Connect { .. } => "connect",
            TransportError::Write { .. } => "write",
            TransportError::Encode(_) => "encode",
            TransportError::Backoff { .. } => "backoff",
            TransportError::Stopped => "stopped",
        }
    }
}

/// Sends records to a trace collector.
///
/// Implementations must be safe to call from many broker threads at once and
/// must bound each call with a finite timeout.
pub trait Transport: Send + Sync {
    /// Application name stamped on outgoing records.
    fn app(&self) -> &str;

    /// Prepare for traffic, e.g. resolve the collector address. Failures here
    /// surface again on the first send.
    fn start(&self) {}

    /// Attempt to deliver one record. Called at most once per record.
    fn send(&self, record: &LogRecord<'_>) -> Result<(), TransportError>;

    /// Release the connection. Later sends fail with [`TransportError::Stopped`].
    fn stop(&self);
}
