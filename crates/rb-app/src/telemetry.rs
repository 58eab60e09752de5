//! Tracing subscriber setup for processes embedding the message board.
//!
//! `RUST_LOG` wins over the configured level when set.

use anyhow::anyhow;
use configs::LogSettings;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing(log: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .map_err(|e| anyhow!("invalid log filter {:?}: {e}", log.level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    }
    .map_err(|e| anyhow!(e))
}
