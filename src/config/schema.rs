//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config file.
//! Every field has a default so an empty file is a valid local-only config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the message tracer.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MsgTracerConfig {
    /// Recorder selection and collector transport.
    pub tracer: TracerConfig,

    /// Local logging settings.
    pub observability: ObservabilityConfig,
}

/// Recorder selection and collector transport settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TracerConfig {
    /// Trace-collector address (`host:port`). Empty selects local-only tracing.
    pub remote_addr: String,

    /// Application name stamped on every record sent to the collector.
    pub app: String,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Per-record write timeout in milliseconds.
    pub write_timeout_ms: u64,

    /// Base delay before reconnecting after a failure, in milliseconds.
    pub reconnect_base_delay_ms: u64,

    /// Maximum reconnect delay in milliseconds.
    pub reconnect_max_delay_ms: u64,
}

impl TracerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// True if a collector address is configured.
    pub fn is_remote(&self) -> bool {
        !self.remote_addr.trim().is_empty()
    }
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            remote_addr: String::new(),
            app: "broker".to_string(),
            connect_timeout_ms: 200,
            write_timeout_ms: 500,
            reconnect_base_delay_ms: 100,
            reconnect_max_delay_ms: 5_000,
        }
    }
}

/// Output format of the local log stream.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter` directive).
    pub log_level: String,

    /// Output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_local_only() {
        let config: MsgTracerConfig = toml::from_str("").unwrap();
        assert_eq!(config, MsgTracerConfig::default());
        assert!(!config.tracer.is_remote());
    }

    #[test]
    fn partial_tables_keep_defaults() {
        let config: MsgTracerConfig = toml::from_str(
            r#"
            [tracer]
            remote_addr = "collector.local:5140"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert!(config.tracer.is_remote());
        assert_eq!(config.tracer.connect_timeout(), Duration::from_millis(200));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn whitespace_address_is_not_remote() {
        let config = TracerConfig {
            remote_addr: "   ".to_string(),
            ..TracerConfig::default()
        };
        assert!(!config.is_remote());
    }
}
