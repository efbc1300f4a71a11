//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, base delay <= max delay)
//! - Check the collector address shape and the log level
//!
//! All problems are collected so one run reports every bad field.

use crate::config::schema::MsgTracerConfig;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("reconnect_base_delay_ms ({base}) exceeds reconnect_max_delay_ms ({max})")]
    DelayRange { base: u64, max: u64 },

    #[error("remote_addr '{0}' is not of the form host:port")]
    RemoteAddr(String),

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Check the collector address shape without resolving it.
pub fn check_remote_addr(addr: &str) -> Result<(), ValidationError> {
    let addr = addr.trim();
    let valid = match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p != 0),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::RemoteAddr(addr.to_string()))
    }
}

/// Check that the base level of a filter directive is a known level.
///
/// Directives like `info,msgtracer=debug` are accepted; only the parts without
/// a target are checked here.
fn check_log_level(directive: &str) -> Result<(), ValidationError> {
    for part in directive.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let level = part.rsplit_once('=').map_or(part, |(_, level)| level);
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ValidationError::LogLevel(part.to_string()));
        }
    }
    Ok(())
}

/// Validate a parsed configuration, returning every problem found.
pub fn validate_config(config: &MsgTracerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let tracer = &config.tracer;

    if tracer.connect_timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "connect_timeout_ms" });
    }
    if tracer.write_timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "write_timeout_ms" });
    }
    if tracer.reconnect_max_delay_ms == 0 {
        errors.push(ValidationError::Zero { field: "reconnect_max_delay_ms" });
    }
    if tracer.reconnect_base_delay_ms > tracer.reconnect_max_delay_ms {
        errors.push(ValidationError::DelayRange {
            base: tracer.reconnect_base_delay_ms,
            max: tracer.reconnect_max_delay_ms,
        });
    }
    if tracer.is_remote() {
        if let Err(e) = check_remote_addr(&tracer.remote_addr) {
            errors.push(e);
        }
    }
    if let Err(e) = check_log_level(&config.observability.log_level) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&MsgTracerConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = MsgTracerConfig::default();
        config.tracer.connect_timeout_ms = 0;
        config.tracer.reconnect_base_delay_ms = 10_000;
        config.tracer.remote_addr = "collector".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Zero { field: "connect_timeout_ms" },
                ValidationError::DelayRange { base: 10_000, max: 5_000 },
                ValidationError::RemoteAddr("collector".to_string()),
                ValidationError::LogLevel("loud".to_string()),
            ]
        );
    }

    #[test]
    fn remote_addr_shapes() {
        assert!(check_remote_addr("127.0.0.1:5140").is_ok());
        assert!(check_remote_addr("collector.internal:5140").is_ok());
        assert!(check_remote_addr("[::1]:5140").is_ok());
        assert!(check_remote_addr(":5140").is_err());
        assert!(check_remote_addr("host:0").is_err());
        assert!(check_remote_addr("host:port").is_err());
    }

    #[test]
    fn filter_directives_are_accepted() {
        assert!(check_log_level("info,msgtracer=debug").is_ok());
        assert!(check_log_level("WARN").is_ok());
        assert!(check_log_level("msgtracer=chatty").is_err());
    }
}
