use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_sentry_writer::config::{FieldNames, WriterConfig};
use tracing_sentry_writer::init::{init_tracing_with_config, LayerConfig};
use tracing_sentry_writer::noop_sink::NoopSink;
use tracing_sentry_writer::writer::SentryWriter;

fn main() {
    let writer = SentryWriter::with_sink(
        Arc::new(NoopSink),
        WriterConfig::default().with_field_names(FieldNames::tracing()),
    );
    init_tracing_with_config(writer, LayerConfig { enable_stdout: false })
        .expect("install subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: wrote {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
