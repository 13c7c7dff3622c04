//! Logging setup for the provider binary.
//!
//! Everything goes to **stderr**. Stdout carries the handshake line and must
//! stay clean, so no layer here ever writes to it.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: standard `EnvFilter` directives, e.g.
//!   `RUST_LOG=hemmer_provider_azurerm=debug` to see every ARM request.
//!
//! ```bash
//! # ARM request tracing plus gRPC spans
//! RUST_LOG=hemmer_provider_azurerm=debug ./hemmer-provider-azurerm
//!
//! # Only the polling loop
//! RUST_LOG=warn,hemmer_provider_azurerm::clients::poller=trace ./hemmer-provider-azurerm
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default directive used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn filter_or(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the global subscriber at [`DEFAULT_LOG_LEVEL`].
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LOG_LEVEL);
}

/// Install the global subscriber, falling back to `default_level` when
/// `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter_or(default_level))
        .with(stderr_layer())
        .init();
}

/// Like [`init_logging`], but returns `false` instead of panicking when a
/// subscriber is already installed.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(filter_or(DEFAULT_LOG_LEVEL))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so only the
    // filter side is checked here.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_LEVEL).is_ok());
        assert!(EnvFilter::try_new("hemmer_provider_azurerm=debug").is_ok());
        assert!(EnvFilter::try_new("warn,hemmer_provider_azurerm::clients::poller=trace").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        let _ = try_init_logging();
        assert!(!try_init_logging());
    }
}
