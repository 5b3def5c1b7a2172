use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the process-wide subscriber. `RUST_LOG` wins over `debug` when set.
///
/// Logs go to stderr so rendered manifests on stdout stay machine-readable.
pub fn init(debug: bool) -> anyhow::Result<()> {
    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()
        .map_err(|err| anyhow::anyhow!("install log subscriber: {err}"))
}
