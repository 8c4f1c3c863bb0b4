//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for the pipeline.
///
/// Reads `FRICTION_LOG` for per-crate levels, for example
/// `FRICTION_LOG=friction_analysis=debug,friction_storage=warn`.
/// Falls back to `friction=info` when unset or invalid.
///
/// Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("FRICTION_LOG")
            .unwrap_or_else(|_| EnvFilter::new("friction=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    });
}
