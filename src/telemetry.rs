//! `tracing` subscriber setup for the CLI binary.

#[cfg(feature = "cli")]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}
