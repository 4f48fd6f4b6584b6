//! Bridge from `tracing` events to a [`LogSink`].
//!
//! Resource modules log with the ordinary `tracing` macros. Installing a
//! [`CollectorLayer`] forwards each event to the sink, which stamps it with
//! the ambient request context. A field named `trace` becomes the record's
//! trace detail; every other field except `message` lands in the record's
//! structured context.

use crate::record::{LogEntry, LogLevel, LogSink};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Targets whose events are never forwarded. The collector client itself
/// logs through these crates, and forwarding them would feed back into the
/// sink.
const TRANSPORT_TARGETS: &[&str] = &[
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "tokio_util",
];

/// `tracing` layer that forwards events to a sink.
#[derive(Debug, Clone)]
pub struct CollectorLayer<K> {
    sink: K,
}

impl<K: LogSink> CollectorLayer<K> {
    /// Forward events to `sink`.
    #[must_use]
    pub const fn new(sink: K) -> Self {
        Self { sink }
    }
}

fn is_transport(target: &str) -> bool {
    TRANSPORT_TARGETS.iter().any(|prefix| {
        target == *prefix
            || target
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

impl<S, K> Layer<S> for CollectorLayer<K>
where
    S: Subscriber,
    K: LogSink + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_transport(metadata.target()) {
            return;
        }

        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);

        self.sink.emit(LogEntry {
            level: LogLevel::from(metadata.level()),
            message: visitor.message.unwrap_or_default(),
            target: Some(metadata.target().to_owned()),
            fields: visitor.fields,
            trace: visitor.trace,
        });
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: Option<String>,
    trace: Option<String>,
    fields: Map<String, Value>,
}

impl EntryVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            "trace" => {
                self.trace = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            name => {
                self.fields.insert(name.to_owned(), value);
            }
        }
    }
}

impl Visit for EntryVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::from(format!("{value:?}")));
    }
}
