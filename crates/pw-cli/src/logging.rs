use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used by `--verbose`.
const VERBOSE: &str = "warn,pathway=debug,pw_core=debug,pw_io=debug,pw_script=debug,pw_cli=debug";

/// Install the stderr subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. `--verbose` replaces the filter
/// with debug output for the Pathway crates.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
