//! Logging configuration for the CLI.
//!
//! Logs go to stderr so they do not interleave with REPL output on stdout.
//! Set `DEBUG_LOGGING=1` (or `debug_logging = true` in the config) to enable
//! debug output for hourglass crates. `RUST_LOG` overrides both.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,hourglass_core=debug,hourglass_cli=debug";
const DEFAULT_DIRECTIVE: &str = "info";

/// Filter directive for the given debug setting
pub fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        DEBUG_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    }
}

/// Initialize stderr logging. Safe to call once per process.
pub fn init(config_debug: bool) {
    let debug_logging = config_debug || std::env::var("DEBUG_LOGGING").is_ok();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(debug_logging)));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(debug_logging, "hourglass logging initialized");
}
