//! Process-wide `tracing` subscriber setup.

use crate::layer::CollectorLayer;
use crate::record::LogSink;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber: `RUST_LOG` filtering (falling back to
/// `default_filter`), human-readable output on stdout, and forwarding of every
/// event that passes the filter to `sink`.
///
/// # Errors
///
/// Returns [`TryInitError`] if a global subscriber is already installed.
pub fn init<K>(default_filter: &str, sink: K) -> Result<(), TryInitError>
where
    K: LogSink + 'static,
{
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(CollectorLayer::new(sink))
        .try_init()
}
