//! Logging initialization
//!
//! Diagnostics go to stderr through tracing-subscriber so that stdout only
//! carries the operator-facing progress lines.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{DrivebackError, DrivebackResult};

/// Level implied by the number of `-v` flags, falling back to `configured`
pub fn effective_level(verbosity: u8, configured: &str) -> &str {
    match verbosity {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; `RUST_LOG` overrides `level`
pub fn init_logging(level: &str) -> DrivebackResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| DrivebackError::Config(format!("Invalid log level '{}': {}", level, e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| DrivebackError::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(level, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level(0, "warn"), "warn");
        assert_eq!(effective_level(1, "warn"), "info");
        assert_eq!(effective_level(2, "warn"), "debug");
        assert_eq!(effective_level(7, "warn"), "trace");
    }
}
