//! `tracing` subscriber setup for binaries built on jigsaw.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used by [`init`].
///
/// `debug` forces debug level for everything. Otherwise `RUST_LOG` is
/// honored, falling back to `info`.
pub fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs a formatting subscriber on stderr.
///
/// Does nothing if a global subscriber is already set.
pub fn init(debug: bool) {
    let installed = tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
