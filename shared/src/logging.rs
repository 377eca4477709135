use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. Later calls do nothing.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(filter)
            .try_init();
        if installed.is_err() {
            // Someone else (a test harness, the embedding app) got there first.
            tracing::debug!("tracing subscriber already installed");
        }
    });
}
