// tests/util.rs
// Shared test helpers for integration tests

/// Route `tracing` output through the test harness so it is only shown for failures.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("ion_keys=debug"))
        .with_test_writer()
        .try_init();
}
