//! Logging and tracing setup.
//!
//! Library code only emits `tracing` events; binaries pick a subscriber
//! here once at startup.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize the global subscriber with human-readable output.
///
/// `default_directive` applies when `RUST_LOG` is unset (e.g. `"info"`).
/// Subsequent calls are ignored.
pub fn init_tracing(default_directive: &str) {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true);

        tracing_subscriber::registry()
            .with(env_filter(default_directive))
            .with(fmt_layer)
            .init();

        info!("dwdm-monitor tracing initialized");
    });
}

/// Initialize tracing with JSON output for log shippers.
pub fn init_tracing_json(default_directive: &str) {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_current_span(true);

        tracing_subscriber::registry()
            .with(env_filter(default_directive))
            .with(fmt_layer)
            .init();

        info!("dwdm-monitor tracing initialized (JSON mode)");
    });
}
