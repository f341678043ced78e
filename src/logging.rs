//! Structured logging setup.
//!
//! Diagnostics go to stderr through `tracing`; command output stays on
//! stdout. `DESKMATE_LOG` (or `RUST_LOG`) overrides the default filter.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_ENV: &str = "DESKMATE_LOG";

/// Install the global subscriber. `verbose` raises the default level from
/// `warn` to `debug` for this crate and the core library.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "deskmate=debug,deskmate_core=debug"
    } else {
        "deskmate=warn,deskmate_core=warn"
    };

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}
