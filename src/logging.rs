//! Logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or to tests that want to see the output).

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// The filter is read from `RUST_LOG` and defaults to `info`, e.g.
/// `RUST_LOG=tariff_engine=debug` to see index statistics and per-evaluation
/// summaries.
///
/// ```no_run
/// tariff_engine::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Installs a debug-level subscriber that writes through the test harness.
///
/// Safe to call from many tests; only the first call takes effect.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
