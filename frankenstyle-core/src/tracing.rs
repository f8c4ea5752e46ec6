//! Tracing subscriber setup.
//!
//! The filter is read from `FRANKENSTYLE_LOG` (EnvFilter syntax) and falls back
//! to `frankenstyle=info`. Safe to call more than once; only the first call
//! installs a subscriber.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "FRANKENSTYLE_LOG";

const DEFAULT_FILTER: &str = "frankenstyle=info";

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global fmt subscriber writing to stderr.
pub fn init_tracing() {
    INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        // Another subscriber may already be installed by the host application.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    });
}
