use std::sync::Arc;
use std::time::Duration;

use sentry::protocol::{Breadcrumb, Event};
use tracing::{error, info};
use tracing_sentry_writer::{
    config::{FieldNames, WriterConfig},
    init::init_tracing,
    sink::EventSink,
    writer::SentryWriter,
};

/// Example of integrating a completely custom destination by implementing
/// the `EventSink` trait directly. Imagine this forwards to some in-house
/// incident tracker instead of Sentry.
struct StdoutSink;

impl EventSink for StdoutSink {
    fn capture_event(&self, event: Event<'static>) {
        println!("[event] {:?} {:?} extra={:?}", event.level, event.message, event.extra);
    }

    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        println!("[breadcrumb] {:?} {:?}", breadcrumb.category, breadcrumb.message);
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

fn main() {
    let sink: Arc<dyn EventSink> = Arc::new(StdoutSink);
    let writer = SentryWriter::with_sink(
        sink,
        WriterConfig::default()
            .with_field_names(FieldNames::tracing())
            .with_breadcrumbs(),
    );

    init_tracing(writer.clone()).expect("install subscriber");

    info!(category = "startup", "custom sink example started");
    error!(db = "my-custom-db", error = "connection reset", "simulated error sent via custom sink");

    writer.close().expect("flush");
}
