//! Logging initialisation.
//!
//! Library code only emits `tracing` events; the binary installs a
//! subscriber once at startup. `RUST_LOG` always wins over the level passed
//! in from configuration, and the fallback is `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a configured level is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Builds the filter: `RUST_LOG`, then `configured`, then [`DEFAULT_LOG_FILTER`].
pub fn build_filter(configured: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(configured.unwrap_or(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber, writing human-readable logs to stderr.
///
/// Set `NO_COLOR` to disable ANSI colours.
pub fn init_logging(configured: Option<&str>) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(build_filter(configured))
        .init();
}
