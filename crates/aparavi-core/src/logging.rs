//! Tracing setup for gateway binaries.
//!
//! MCP servers speak their protocol on stdout, so all log output goes to
//! stderr. `RUST_LOG` overrides the default filter.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// `default_directive` is used when `RUST_LOG` is unset, e.g.
/// `"aparavi_mcp=info,aparavi_client=info"`.
pub fn init_logging(default_directive: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}
