use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor an explicit filter is given.
///
/// GPU and windowing crates are chatty at debug level, so they are capped.
pub const DEFAULT_FILTER: &str =
    "info,wgpu_core=warn,wgpu_hal=warn,naga=warn,winit=info,cosmic_text=info";

/// Install the global fmt subscriber with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Install the global fmt subscriber.
///
/// An explicit `filter` wins over `RUST_LOG`, which wins over
/// [`DEFAULT_FILTER`]. Calling this twice is harmless; the second subscriber
/// is discarded.
pub fn init_with_filter(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
}
