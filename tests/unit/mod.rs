mod cycle_tests;
mod trigger_tests;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Opt-in log output for debugging test runs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}
