//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::HubConfig;

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to the
/// configured filter. Later calls leave the first subscriber in place.
pub fn init(config: &HubConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
