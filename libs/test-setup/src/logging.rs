use tracing_subscriber::{EnvFilter, fmt};

/// Installs a test writer subscriber honouring `RUST_LOG`. Safe to call from every test.
pub fn init_logger() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
