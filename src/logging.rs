//! # Structured Logging Module
//!
//! Environment-aware structured logging for debugging the interleaving of
//! view-state changes, pool recomputation and publication.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call multiple times; only the first call has an effect. The filter
/// is taken from `RUST_LOG` when set, otherwise from the `VOXELVIEW_ENV`
/// environment ("production" quiets debug output).
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_log_level()));

        // Don't panic if a subscriber is already installed (tests, embedders)
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_filter(filter),
            )
            .try_init();
    });
}

fn default_log_level() -> String {
    match get_environment().as_str() {
        "production" => "voxelview_core=info".to_string(),
        _ => "voxelview_core=debug".to_string(),
    }
}

fn get_environment() -> String {
    std::env::var("VOXELVIEW_ENV").unwrap_or_else(|_| "development".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }

    #[test]
    fn test_default_environment_is_development() {
        if std::env::var("VOXELVIEW_ENV").is_err() {
            assert_eq!(get_environment(), "development");
        }
    }
}
