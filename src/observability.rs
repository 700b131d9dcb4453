// src/observability.rs
//! Logging and metrics setup

use crate::utils::config::ObservabilityConfig;
use crate::utils::errors::{RedirectError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| RedirectError::ConfigError(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| RedirectError::ConfigError(format!("Tracing init failed: {}", e)))
}

/// Register metric descriptions with whatever recorder the host installed
pub fn describe_metrics() {
    metrics::describe_counter!(
        "origin_redirect_calls_total",
        "Calls handled on the redirect path, by outcome"
    );
    metrics::describe_counter!(
        "origin_redirect_toggle_changes_total",
        "Transitions of the redirect switch"
    );
}
