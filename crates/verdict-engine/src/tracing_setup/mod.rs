//! Subscriber installation and span definitions.

pub mod spans;

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use verdict_core::config::ObservabilityConfig;

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the global subscriber once. `RUST_LOG` overrides the configured
/// level. Later calls are no-ops; returns whether a subscriber from this
/// function is active.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let installed = if config.json {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .try_init()
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).try_init()
        };
        installed.is_ok()
    })
}
