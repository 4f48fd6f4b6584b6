//! Fire-and-forget delivery to the remote log collector.
//!
//! Every [`CollectorSink::emit`] builds the record on the caller's task (so
//! it can read the ambient request context) and then spawns a detached
//! delivery task. The caller never awaits that task. Each delivery is a single
//! `POST` bounded by the configured timeout; transport errors, timeouts and
//! non-2xx responses are all dropped without retry.
//!
//! The number of deliveries in flight is capped. When the cap is reached new
//! records are dropped, so a stalled collector can never accumulate unbounded
//! work inside the service.

use crate::record::{LogEntry, LogRecord, LogSink};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// Default cap on concurrent deliveries.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

/// Errors building a collector sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The HTTP client could not be constructed
    #[error("Failed to build collector HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Collector settings, read once at startup.
///
/// Delivery is enabled only when all four of `base_url`, `api_path`,
/// `timeout` and `service` are present. A zero timeout counts as absent.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Collector origin, e.g. `http://logging:4000`
    pub base_url: Option<String>,
    /// Path appended to `base_url`, e.g. `/api/v1/logs`
    pub api_path: Option<String>,
    /// Hard deadline for one delivery attempt
    pub timeout: Option<Duration>,
    /// Service identity stamped on every record
    pub service: Option<String>,
    /// Maximum deliveries in flight before records are dropped
    pub max_in_flight: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_path: None,
            timeout: None,
            service: None,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl SinkConfig {
    /// Whether every setting required for delivery is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

        present(&self.base_url)
            && present(&self.api_path)
            && present(&self.service)
            && self.timeout.is_some_and(|t| !t.is_zero())
    }
}

struct Delivery {
    client: reqwest::Client,
    url: String,
    service: String,
    timeout: Duration,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
}

/// Best-effort HTTP log sink.
///
/// Cheap to clone; clones share the HTTP connection pool and the in-flight
/// cap.
#[derive(Clone)]
pub struct CollectorSink {
    delivery: Option<Arc<Delivery>>,
}

impl std::fmt::Debug for CollectorSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.delivery {
            Some(d) => f
                .debug_struct("CollectorSink")
                .field("url", &d.url)
                .field("service", &d.service)
                .field("timeout", &d.timeout)
                .field("max_in_flight", &d.max_in_flight)
                .finish(),
            None => f.write_str("CollectorSink(disabled)"),
        }
    }
}

impl CollectorSink {
    /// Build a sink from `config`.
    ///
    /// An incomplete configuration yields a disabled sink on which every
    /// emit is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Client`] if the HTTP client cannot be built.
    pub fn new(config: SinkConfig) -> Result<Self, SinkError> {
        if !config.is_complete() {
            return Ok(Self::disabled());
        }

        let (Some(base_url), Some(api_path), Some(timeout), Some(service)) =
            (config.base_url, config.api_path, config.timeout, config.service)
        else {
            return Ok(Self::disabled());
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        let max_in_flight = config.max_in_flight.max(1);

        Ok(Self {
            delivery: Some(Arc::new(Delivery {
                client,
                url: format!("{base_url}{api_path}"),
                service,
                timeout,
                permits: Arc::new(Semaphore::new(max_in_flight)),
                max_in_flight,
            })),
        })
    }

    /// A sink that never delivers anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { delivery: None }
    }

    /// Whether records are actually delivered.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.delivery.is_some()
    }

    /// Number of deliveries currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.delivery
            .as_ref()
            .map_or(0, |d| d.max_in_flight - d.permits.available_permits())
    }
}

impl LogSink for CollectorSink {
    fn emit(&self, entry: LogEntry) {
        let Some(delivery) = &self.delivery else {
            return;
        };
        // Outside a Tokio runtime there is nowhere to run the delivery.
        let Ok(handle) = Handle::try_current() else {
            return;
        };
        let Ok(permit) = Arc::clone(&delivery.permits).try_acquire_owned() else {
            return;
        };

        let record = LogRecord::capture(&delivery.service, entry);
        let request = delivery.client.post(&delivery.url).json(&record);
        let deadline = delivery.timeout;

        handle.spawn(async move {
            let _permit = permit;
            let _ = tokio::time::timeout(deadline, request.send()).await;
        });
    }
}
