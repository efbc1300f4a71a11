//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Recorders produce:
//!     → logging.rs (subscriber that renders local trace lines and warnings)
//!     → metrics.rs (event, failure and fallback counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Whatever metrics exporter the host process installs
//! ```

pub mod logging;
pub mod metrics;
