// Shared helpers for integration tests

// Each test binary compiles this module separately and not all of them use
// every helper.
#![allow(dead_code)]

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once per binary.
///
/// Honors `RUST_LOG`, e.g. `RUST_LOG=cdp_pdf=debug cargo test`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
