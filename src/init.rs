use crate::error::WriterError;
use crate::writer::SentryWriter;
use tracing::Subscriber;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

/// Configuration of the subscriber installed by [`init_tracing_with_config`].
///
/// **Fields**
/// - `enable_stdout`: if `true`, a plain `tracing_subscriber::fmt` layer is
///   added next to the Sentry one so events are also printed to stdout.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { enable_stdout: true }
    }
}

/// JSON formatting layer writing every event into `writer`.
///
/// Event fields are flattened to the top level of the record and span
/// context is left out, so the record carries `timestamp`, `level`,
/// `message`, `target` and the event fields. Pair it with a writer
/// configured with [`FieldNames::tracing`](crate::config::FieldNames::tracing).
pub fn json_layer<S>(writer: SentryWriter) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer)
}

/// Install a global `tracing` subscriber reporting into `writer`.
///
/// **Returns**
/// - `Err(WriterError::Subscriber)` if a global subscriber is already set.
pub fn init_tracing_with_config(writer: SentryWriter, config: LayerConfig) -> Result<(), WriterError> {
    let layer = json_layer(writer);

    // Слой с Sentry подключаем всегда, `fmt`‑слой для консоли только при
    // `enable_stdout = true`. Типы subscriber'а различаются, поэтому две ветки.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Same as [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(writer: SentryWriter) -> Result<(), WriterError> {
    init_tracing_with_config(writer, LayerConfig::default())
}
