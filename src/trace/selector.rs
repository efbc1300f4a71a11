//! Tracer selection.
//!
//! # Responsibilities
//! - Define the capability set every recorder offers
//! - Pick the local or remote recorder once, at startup
//!
//! # Design Decisions
//! - The chosen tracer is injected into the broker as a `SharedTracer`;
//!   there is no mutable global and no runtime reconfiguration
//! - `stop` exists on every tracer (no-op locally) so shutdown is uniform

use std::sync::Arc;

use crate::config::validation::check_remote_addr;
use crate::config::TracerConfig;
use crate::trace::event::{BackendOffset, MessageRef, SubState};
use crate::trace::local::LocalTracer;
use crate::trace::remote::RemoteTracer;
use crate::transport::CollectorClient;

/// Records publish and delivery-state events for messages.
///
/// Called synchronously on broker threads; implementations must be safe for
/// concurrent use and must never fail observably.
pub trait MsgTracer: Send + Sync {
    /// Lifecycle hook, called once before any traffic.
    fn start(&self);

    /// A message was durably appended at `disk_offset`; the topic now holds
    /// `current_count` messages.
    fn trace_pub(
        &self,
        topic: &str,
        trace_id: u64,
        msg: &MessageRef<'_>,
        disk_offset: BackendOffset,
        current_count: i64,
    );

    /// A message moved to `state` while delivered to `client_id`.
    fn trace_sub(
        &self,
        topic: &str,
        state: SubState,
        trace_id: u64,
        msg: &MessageRef<'_>,
        client_id: &str,
    );

    /// Release resources. Called once at shutdown; no trace calls may follow.
    fn stop(&self) {}
}

/// The tracer selected for this process.
pub enum Tracer {
    Local(LocalTracer),
    Remote(RemoteTracer<CollectorClient>),
}

/// Tracer handle shared by every broker call site.
pub type SharedTracer = Arc<Tracer>;

impl Tracer {
    /// Select a tracer from a collector address. Empty selects the local log.
    pub fn configure(remote_addr: &str) -> Self {
        Self::from_config(&TracerConfig {
            remote_addr: remote_addr.to_string(),
            ..TracerConfig::default()
        })
    }

    /// Select a tracer from configuration.
    ///
    /// A malformed collector address is reported here; the remote tracer is
    /// still installed and every call degrades to the local log.
    pub fn from_config(config: &TracerConfig) -> Self {
        if !config.is_remote() {
            tracing::info!("Message tracer writing to local log");
            return Tracer::Local(LocalTracer::new());
        }

        let addr = config.remote_addr.trim();
        if let Err(e) = check_remote_addr(addr) {
            tracing::warn!(error = %e, "Remote message tracer misconfigured, trace events will fall back to the local log");
        }
        tracing::info!(collector = %addr, app = %config.app, "Message tracer forwarding to remote collector");

        Tracer::Remote(RemoteTracer::new(CollectorClient::new(addr, config)))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Tracer::Remote(_))
    }

    /// Collector address in remote mode.
    pub fn remote_addr(&self) -> Option<&str> {
        match self {
            Tracer::Local(_) => None,
            Tracer::Remote(remote) => Some(remote.transport().addr()),
        }
    }

    pub fn into_shared(self) -> SharedTracer {
        Arc::new(self)
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Tracer::Local(LocalTracer::new())
    }
}

impl MsgTracer for Tracer {
    fn start(&self) {
        match self {
            Tracer::Local(local) => local.start(),
            Tracer::Remote(remote) => remote.start(),
        }
    }

    fn trace_pub(
        &self,
        topic: &str,
        trace_id: u64,
        msg: &MessageRef<'_>,
        disk_offset: BackendOffset,
        current_count: i64,
    ) {
        match self {
            Tracer::Local(local) => local.trace_pub(topic, trace_id, msg, disk_offset, current_count),
            Tracer::Remote(remote) => remote.trace_pub(topic, trace_id, msg, disk_offset, current_count),
        }
    }

    fn trace_sub(
        &self,
        topic: &str,
        state: SubState,
        trace_id: u64,
        msg: &MessageRef<'_>,
        client_id: &str,
    ) {
        match self {
            Tracer::Local(local) => local.trace_sub(topic, state, trace_id, msg, client_id),
            Tracer::Remote(remote) => remote.trace_sub(topic, state, trace_id, msg, client_id),
        }
    }

    fn stop(&self) {
        match self {
            Tracer::Local(local) => local.stop(),
            Tracer::Remote(remote) => remote.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_address_selects_local() {
        assert!(!Tracer::configure("").is_remote());
        assert!(!Tracer::configure("  ").is_remote());
        assert!(!Tracer::default().is_remote());
    }

    #[test]
    fn address_selects_remote() {
        let tracer = Tracer::configure("127.0.0.1:5140");
        assert!(tracer.is_remote());
        assert_eq!(tracer.remote_addr(), Some("127.0.0.1:5140"));
    }

    #[test]
    fn from_config_passes_transport_settings_to_client() {
        use crate::transport::Transport;
        use std::time::Duration;

        let config = TracerConfig {
            remote_addr: " 10.0.0.5:5140 ".to_string(),
            app: "edge-7".to_string(),
            connect_timeout_ms: 50,
            write_timeout_ms: 75,
            ..TracerConfig::default()
        };

        let Tracer::Remote(remote) = Tracer::from_config(&config) else {
            panic!("expected a remote tracer");
        };
        let client = remote.transport();
        assert_eq!(client.addr(), "10.0.0.5:5140");
        assert_eq!(client.app(), "edge-7");
        assert_eq!(client.connect_timeout(), Duration::from_millis(50));
        assert_eq!(client.write_timeout(), Duration::from_millis(75));
    }

    #[test]
    fn malformed_address_still_installs_remote() {
        let tracer = Tracer::configure("collector-without-port");
        assert!(tracer.is_remote());
    }

    #[test]
    fn tracer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tracer>();
        assert_send_sync::<SharedTracer>();
    }
}
