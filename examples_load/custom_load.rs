use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

use tracing_sentry_writer::config::{FieldNames, WriterConfig};
use tracing_sentry_writer::init::{init_tracing_with_config, LayerConfig};
use tracing_sentry_writer::level::Level;
use tracing_sentry_writer::noop_sink::NoopSink;
use tracing_sentry_writer::writer::SentryWriter;

/// Mixed load from several threads with breadcrumbs enabled, so both the
/// capture and the breadcrumb paths are exercised.
fn main() {
    let config = WriterConfig::default()
        .with_field_names(FieldNames::tracing())
        .with_levels([Level::Error])
        .with_breadcrumbs()
        .with_flush_timeout(Duration::from_millis(200));
    let writer = SentryWriter::with_sink(Arc::new(NoopSink), config);
    init_tracing_with_config(writer, LayerConfig { enable_stdout: false })
        .expect("install subscriber");

    let threads: u64 = 4;
    let per_thread: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..per_thread {
                    if i % 10 == 0 {
                        error!(thread = t, iteration = i, error = "simulated", "custom load test error");
                    } else {
                        info!(thread = t, iteration = i, "custom load test breadcrumb");
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("load thread panicked");
    }

    let n = threads * per_thread;
    let elapsed = start.elapsed();
    println!("custom config: wrote {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
