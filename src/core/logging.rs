use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::LogFormat;

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// `--json` output. `RUST_LOG` overrides the default filter.
pub fn init(format: LogFormat, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("costbot={},warn", level)));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A second init (tests, embedding) keeps the existing subscriber.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
