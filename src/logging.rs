//! Logging setup for the `intentql` binary and embedding applications.
//!
//! The library itself only emits `tracing` events; nothing is printed unless
//! the host installs a subscriber, e.g. with [`init`].

use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `fallback` (a filter directive such as
/// `"info"` or `"intentql=debug"`) is used. Returns `false` when a global
/// subscriber was already installed.
pub fn init(fallback: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
