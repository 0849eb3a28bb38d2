use tracing_subscriber::EnvFilter;

/// Initialise logging. Defaults to `info`; `RUST_LOG` overrides when set so
/// the overlay can be debugged without rebuilding.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
