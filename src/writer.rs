use crate::config::{SinkOptions, WriterConfig};
use crate::error::WriterError;
use crate::level::{mapped_level, Level};
use crate::record::{decode_record, event_from_fields, level_from_fields, parse_event, parse_level, LogEvent};
use crate::sink::EventSink;
use sentry::{Client, Hub, Scope};
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::{debug, trace, warn, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Writer that turns JSON log records into Sentry events.
///
/// Every record goes through the same policy:
/// - records without a reportable level, or that are not a JSON object
///   with a string-like message and error, are dropped;
/// - records of an enabled level are captured as events, and a fatal
///   event is flushed before the write returns;
/// - records of any other level become breadcrumbs when breadcrumbs are
///   enabled, and are dropped otherwise.
///
/// Writes always report the whole buffer as consumed and never return an
/// error. A broken or evolving log schema must not break the logging path
/// of the host application, so every drop is silent.
///
/// The writer is cheap to clone and safe to share between threads. It can
/// be plugged into `tracing_subscriber::fmt` as a [`MakeWriter`], see
/// [`crate::init`].
#[derive(Clone)]
pub struct SentryWriter {
    sink: Arc<dyn EventSink>,
    config: Arc<WriterConfig>,
}

impl fmt::Debug for SentryWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryWriter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SentryWriter {
    /// Creates a writer with its own Sentry client and hub.
    ///
    /// The hub is private to the writer; the process-wide Sentry hub is
    /// neither read nor modified.
    ///
    /// **Returns**
    /// - `Err(WriterError::InvalidDsn)` / `Err(WriterError::InvalidIgnorePattern)`
    ///   when the sink options are invalid.
    pub fn new(options: SinkOptions, config: WriterConfig) -> Result<Self, WriterError> {
        let client = Arc::new(Client::with_options(options.into_client_options()?));
        debug!(enabled = client.is_enabled(), "created sentry client for log writer");
        let hub = Arc::new(Hub::new(Some(client), Arc::new(Scope::default())));
        Ok(Self::with_sink(hub, config))
    }

    /// Creates a writer that reports through an existing hub.
    ///
    /// **Returns**
    /// - `Err(WriterError::MissingClient)` if the hub has no client bound.
    pub fn with_hub(hub: Arc<Hub>, config: WriterConfig) -> Result<Self, WriterError> {
        if hub.client().is_none() {
            return Err(WriterError::MissingClient);
        }
        Ok(Self::with_sink(hub, config))
    }

    /// Creates a writer on top of any [`EventSink`].
    pub fn with_sink(sink: Arc<dyn EventSink>, config: WriterConfig) -> Self {
        SentryWriter {
            sink,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Level of a raw record, as the write path would see it.
    pub fn parse_level(&self, data: &[u8]) -> Level {
        parse_level(data, &self.config.field_names)
    }

    /// Event of a raw record, as the write path would see it, minus the
    /// level.
    pub fn parse_event(&self, data: &[u8]) -> Option<LogEvent> {
        parse_event(data, &self.config.field_names, &self.config.clock)
    }

    /// Same as [`io::Write::write`] with the level supplied by the caller
    /// instead of being read from the record.
    pub fn write_level(&self, level: Level, data: &[u8]) -> io::Result<usize> {
        self.dispatch(Some(level), data);
        Ok(data.len())
    }

    /// Flushes pending deliveries.
    ///
    /// **Returns**
    /// - `Err(WriterError::FlushTimeout)` if the sink did not finish within
    ///   the configured flush timeout.
    pub fn close(&self) -> Result<(), WriterError> {
        if self.sink.flush(self.config.flush_timeout) {
            return Ok(());
        }
        warn!(timeout = ?self.config.flush_timeout, "sentry flush timed out on close");
        Err(WriterError::FlushTimeout(self.config.flush_timeout))
    }

    /// Routes one record. Nothing here may fail towards the caller.
    fn dispatch(&self, level: Option<Level>, data: &[u8]) {
        let names = &self.config.field_names;

        let Some(fields) = decode_record(data) else {
            trace!("dropping log record that is not a JSON object");
            return;
        };

        // Уровень из метаданных `tracing`, если передан, иначе из поля записи.
        let level = level.unwrap_or_else(|| level_from_fields(&fields, names));
        let Some(severity) = mapped_level(level) else {
            trace!(%level, "dropping log record without a reportable level");
            return;
        };

        let Some(mut event) = event_from_fields(fields, names, &self.config.clock) else {
            trace!("dropping log record with a structured message or error");
            return;
        };
        event.level = severity;

        if self.config.levels.contains(&level) {
            self.sink.capture_event(event.into_sentry_event());
            // процесс может вот-вот завершиться, отправляем синхронно
            if severity == sentry::Level::Fatal && !self.sink.flush(self.config.flush_timeout) {
                trace!(timeout = ?self.config.flush_timeout, "flush after fatal event timed out");
            }
            return;
        }

        if self.config.breadcrumbs {
            self.sink.add_breadcrumb(event.into_breadcrumb());
        }
    }
}

impl io::Write for SentryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &SentryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Ошибки доставки наружу не пробрасываются.
        self.dispatch(None, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Per-event handle handed out through [`MakeWriter`].
///
/// When created for a known `tracing` event it carries the event's level,
/// which is then used instead of the one serialized in the record.
#[derive(Debug)]
pub struct EventWriter<'a> {
    writer: &'a SentryWriter,
    level: Option<Level>,
}

impl io::Write for EventWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.dispatch(self.level, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SentryWriter {
    type Writer = EventWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter { writer: self, level: None }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        EventWriter {
            writer: self,
            level: Some(Level::from(*meta.level())),
        }
    }
}
