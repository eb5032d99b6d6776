//! Tracing setup for applications embedding the engine.

use anyhow::Result;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "acl_engine=info";

/// Install a JSON `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails instead of
/// panicking when a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .json()
        .try_init()
        .map_err(anyhow::Error::msg)
}
