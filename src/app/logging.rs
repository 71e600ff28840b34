use super::config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the configured level applies to this crate with dependencies
/// capped at warn. Safe to call more than once.
pub fn init_tracing(level: LogLevel) {
    let level: tracing::Level = level.into();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,enviro_forwarder={level}")));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
