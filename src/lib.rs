//! Writer that turns structured JSON log records into Sentry events.
//!
//! [`SentryWriter`] implements [`std::io::Write`] and
//! `tracing_subscriber`'s `MakeWriter`. Records of the enabled levels are
//! captured as Sentry events, other records can be kept as breadcrumbs,
//! and everything else is dropped without ever failing the write.
//!
//! ```no_run
//! use tracing_sentry_writer::config::{FieldNames, SinkOptions, WriterConfig};
//! use tracing_sentry_writer::init::init_tracing;
//! use tracing_sentry_writer::writer::SentryWriter;
//!
//! let writer = SentryWriter::new(
//!     SinkOptions::with_dsn("https://public@sentry.example.com/1"),
//!     WriterConfig::default().with_field_names(FieldNames::tracing()),
//! )?;
//! init_tracing(writer.clone())?;
//!
//! tracing::error!(error = "dial timeout", "request failed");
//! writer.close()?;
//! # Ok::<(), tracing_sentry_writer::error::WriterError>(())
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod level;
pub mod record;
pub mod sink;
pub mod stacktrace;
pub mod writer;

pub mod init;
pub mod noop_sink;

pub use config::{Clock, FieldNames, SinkOptions, WriterConfig};
pub use error::WriterError;
pub use level::{mapped_level, sentry_level, Level};
pub use record::LogEvent;
pub use sink::EventSink;
pub use writer::SentryWriter;
