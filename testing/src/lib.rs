//! # Content Testing
//!
//! Testing utilities for the content service.
//!
//! - [`RecordingSink`]: a [`LogSink`] that keeps every record in memory so
//!   tests can assert what was logged, how often, and under which request
//! - [`capture_logs`]: run async code under a subscriber that forwards
//!   `tracing` events into a fresh `RecordingSink`
//! - [`fixtures`]: ready-made request contexts
//!
//! ## Example
//!
//! ```
//! use content_runtime::LogSink;
//! use content_testing::RecordingSink;
//!
//! let sink = RecordingSink::new();
//! sink.info("hello");
//! assert_eq!(sink.single().message, "hello");
//! ```

use content_runtime::{CollectorLayer, LogEntry, LogRecord, LogSink};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::layer::SubscriberExt;

/// Service name stamped on recorded entries.
pub const TEST_SERVICE: &str = "content-test";

/// In-memory sink.
///
/// Records are completed on the emitting task, exactly like the production
/// sink does, so the ambient request context is captured.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records whose message contains `needle`.
    #[must_use]
    pub fn matching(&self, needle: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.message.contains(needle))
            .collect()
    }

    /// The one and only record.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one record was captured.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn single(&self) -> LogRecord {
        let mut records = self.records();
        if records.len() != 1 {
            panic!("expected exactly one record, got {}: {records:?}", records.len());
        }
        records.remove(0)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, entry: LogEntry) {
        let record = LogRecord::capture(TEST_SERVICE, entry);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Run `future` with a thread-local subscriber that forwards every `tracing`
/// event into a fresh [`RecordingSink`].
///
/// The subscriber is scoped to the current thread, so use a
/// `current_thread` runtime (the default for `#[tokio::test]`).
pub async fn capture_logs<F>(future: F) -> (F::Output, RecordingSink)
where
    F: Future,
{
    let sink = RecordingSink::new();
    let subscriber = tracing_subscriber::registry().with(CollectorLayer::new(sink.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);
    let output = future.await;
    (output, sink)
}

/// Ready-made request contexts.
pub mod fixtures {
    use content_core::RequestContext;

    /// A `GET` context with a fixed request id.
    #[must_use]
    pub fn get(path: &str) -> RequestContext {
        RequestContext::new("test-request-id", "GET", path)
    }

    /// A fully populated context.
    #[must_use]
    pub fn full(request_id: &str, path: &str) -> RequestContext {
        RequestContext::new(request_id, "GET", path)
            .with_client_ip("203.0.113.10")
            .with_user_id("user-1")
    }
}
