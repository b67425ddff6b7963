//! `authforge-observability` — shared tracing/logging setup.
//!
//! The engine crates only *emit* via the `tracing` macros; wiring a
//! subscriber is the embedding process's job, and this crate is the one
//! place that does it.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing/logging.
///
/// JSON logs, filtered via `RUST_LOG` (default `info`). Safe to call multiple
/// times; subsequent calls are no-ops.
pub fn init() {
    init_with_default_filter("info");
}

/// Like [`init`], but with an explicit fallback filter for when `RUST_LOG`
/// is unset (e.g. `"authforge_engine=debug"` while developing the resolver).
pub fn init_with_default_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
