use tracing_subscriber::{
    fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

fn env_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "off" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global tracing subscriber. `RUST_LOG` overrides `verbose`.
///
/// Panics if a global subscriber is already set; see [`try_init_logging`].
pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(env_filter(verbose))
        .init();
}

/// Like [`init_logging`], but reports an already-installed subscriber as an error.
pub fn try_init_logging(verbose: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(env_filter(verbose))
        .try_init()
}
