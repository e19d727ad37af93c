//! Logging setup for the replay tool.
//!
//! Logs go to stderr so the JSON report on stdout stays parseable.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Initialize tracing from `RUST_LOG`, defaulting to warnings only.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .compact()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    });
}
