//! Logging setup
//!
//! The library only emits `tracing` events. Binaries and tests that want to
//! see them call `init_logging` once; `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber writing to stderr
///
/// Safe to call more than once; only the first call installs a subscriber.
/// Returns true when this call installed it.
///
/// # Arguments
///
/// * `default_filter` - Filter used when `RUST_LOG` is unset (e.g. `"disco_core=info"`)
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
