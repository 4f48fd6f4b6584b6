//! # Content Runtime
//!
//! Observability pipeline for the content service.
//!
//! Log entries are produced either directly through a [`LogSink`] or by the
//! ordinary `tracing` macros via [`CollectorLayer`]. The production sink,
//! [`CollectorSink`], enriches each entry with the ambient request context and
//! posts it to a remote collector in a detached task. Delivery is best-effort:
//! a single attempt with a hard timeout, with every failure discarded, so a
//! slow or unreachable collector never touches request latency or outcome.
//!
//! ```rust,no_run
//! use content_runtime::{telemetry, CollectorSink, SinkConfig};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = CollectorSink::new(SinkConfig {
//!     base_url: Some("http://logging:4000".into()),
//!     api_path: Some("/api/v1/logs".into()),
//!     timeout: Some(Duration::from_millis(500)),
//!     service: Some("content-service".into()),
//!     ..SinkConfig::default()
//! })?;
//!
//! telemetry::init("content_service=info", sink)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod layer;
pub mod record;
pub mod telemetry;

pub use collector::{CollectorSink, SinkConfig, SinkError, DEFAULT_MAX_IN_FLIGHT};
pub use layer::CollectorLayer;
pub use record::{LogEntry, LogLevel, LogRecord, LogSink, NoopSink};
