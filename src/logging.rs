//! Logging initialization.
//!
//! `LINKFOLLOW_LOG` overrides the configured level using the usual
//! `EnvFilter` directive syntax (e.g. `linkfollow=trace`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "LINKFOLLOW_LOG";

/// Build the filter: environment first, then the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("linkfollow={}", level.to_lowercase())))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(level: &str) {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer)
        .try_init();
}
