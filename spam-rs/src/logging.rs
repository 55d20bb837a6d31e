//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Result, SpamError};

/// Install the global subscriber; `RUST_LOG` overrides the configured level
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| SpamError::Configuration(format!("Invalid log level {:?}: {}", config.level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init(),
    };

    result.map_err(|e| SpamError::Configuration(format!("Failed to set tracing subscriber: {}", e)))
}
