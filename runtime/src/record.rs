//! Log records and the sink seam.

use chrono::{DateTime, Utc};
use content_core::context;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Severity of a log record, using the collector's level names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Finest-grained diagnostics
    Verbose,
    /// Debugging detail
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected but recoverable
    Warn,
    /// A failure
    Error,
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Self::Verbose,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

/// What a producer hands to a sink.
///
/// The sink completes it into a [`LogRecord`] by adding its service identity,
/// the ambient request context and a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Severity
    pub level: LogLevel,
    /// Human-readable message
    pub message: String,
    /// Emitting module
    pub target: Option<String>,
    /// Structured fields attached by the producer
    pub fields: Map<String, Value>,
    /// Stack or cause chain for error records
    pub trace: Option<String>,
}

impl LogEntry {
    /// Entry with no target, fields or trace.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            target: None,
            fields: Map::new(),
            trace: None,
        }
    }

    /// Set the emitting module.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add a structured field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach trace detail.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

/// Wire shape posted to the collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Service identity
    pub service: String,
    /// Severity
    pub level: LogLevel,
    /// Message text
    pub message: String,
    /// Emitting module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Structured fields
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    /// Stack or cause chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    /// Correlation identifier of the emitting request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// HTTP method of the emitting request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Path of the emitting request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Client address of the emitting request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    /// Calling user of the emitting request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Complete `entry` with the ambient request context, if any.
    ///
    /// Must be called on the producing task: the request context is
    /// task-local and is not visible from a delivery task.
    #[must_use]
    pub fn capture(service: &str, entry: LogEntry) -> Self {
        let ctx = context::current();
        let ctx = ctx.as_deref();

        Self {
            service: service.to_owned(),
            level: entry.level,
            message: entry.message,
            target: entry.target,
            context: entry.fields,
            trace: entry.trace,
            request_id: ctx.map(|c| c.request_id().to_owned()),
            method: ctx.map(|c| c.method().to_owned()),
            path: ctx.map(|c| c.path().to_owned()),
            client_ip: ctx.and_then(|c| c.client_ip()).map(str::to_owned),
            user_id: ctx.and_then(|c| c.user_id()).map(str::to_owned),
            timestamp: Utc::now(),
        }
    }
}

/// Destination for log entries.
///
/// Implementations must return promptly and must not panic or surface
/// delivery failures to the caller.
pub trait LogSink: Send + Sync {
    /// Hand one entry to the sink.
    fn emit(&self, entry: LogEntry);

    /// Emit a verbose message.
    fn verbose(&self, message: &str) {
        self.emit(LogEntry::new(LogLevel::Verbose, message));
    }

    /// Emit a debug message.
    fn debug(&self, message: &str) {
        self.emit(LogEntry::new(LogLevel::Debug, message));
    }

    /// Emit an informational message.
    fn info(&self, message: &str) {
        self.emit(LogEntry::new(LogLevel::Info, message));
    }

    /// Emit a warning.
    fn warn(&self, message: &str) {
        self.emit(LogEntry::new(LogLevel::Warn, message));
    }

    /// Emit an error, optionally with trace detail.
    fn error(&self, message: &str, trace: Option<&str>) {
        let mut entry = LogEntry::new(LogLevel::Error, message);
        entry.trace = trace.map(str::to_owned);
        self.emit(entry);
    }
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn emit(&self, entry: LogEntry) {
        (**self).emit(entry);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn emit(&self, _entry: LogEntry) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use content_core::RequestContext;

    #[test]
    fn capture_outside_request_has_no_request_fields() {
        let record = LogRecord::capture("content", LogEntry::new(LogLevel::Info, "boot"));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["service"], "content");
        assert_eq!(json["level"], "info");
        assert_eq!(json["message"], "boot");
        assert!(json.get("requestId").is_none());
        assert!(json.get("context").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn capture_merges_ambient_context() {
        let ctx = RequestContext::new("r-9", "GET", "/api/v1/songs?page=2")
            .with_client_ip("198.51.100.4")
            .with_user_id("u-1");

        let entry = LogEntry::new(LogLevel::Warn, "slow query")
            .with_target("content_service::songs")
            .with_field("latencyMs", 812);

        let record = context::establish_sync(ctx, || LogRecord::capture("content", entry));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["requestId"], "r-9");
        assert_eq!(json["method"], "GET");
        assert_eq!(json["path"], "/api/v1/songs?page=2");
        assert_eq!(json["clientIp"], "198.51.100.4");
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["target"], "content_service::songs");
        assert_eq!(json["context"]["latencyMs"], 812);
        assert_eq!(json["level"], "warn");
    }

    #[test]
    fn tracing_levels_map_to_collector_names() {
        assert_eq!(LogLevel::from(&tracing::Level::TRACE), LogLevel::Verbose);
        assert_eq!(LogLevel::from(&tracing::Level::DEBUG), LogLevel::Debug);
        assert_eq!(LogLevel::from(&tracing::Level::INFO), LogLevel::Info);
        assert_eq!(LogLevel::from(&tracing::Level::WARN), LogLevel::Warn);
        assert_eq!(LogLevel::from(&tracing::Level::ERROR), LogLevel::Error);
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let sink = NoopSink;
        sink.info("ignored");
        sink.error("ignored", Some("trace"));
    }
}
