//! Structured logging.
//!
//! Uses the `tracing` ecosystem. The filter comes from `RUST_LOG` when set,
//! otherwise from the default directive passed by the binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "election_client=info,election_cli=info";

/// Install the global subscriber, writing to stderr.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
