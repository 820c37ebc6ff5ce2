use std::time::Duration;

/// Errors surfaced by construction and shutdown of the writer. The write
/// path itself never fails.
#[derive(thiserror::Error, Debug)]
pub enum WriterError {
    #[error("invalid sentry DSN: {0}")]
    InvalidDsn(#[from] sentry::types::ParseDsnError),

    #[error("invalid ignore pattern {pattern:?}: {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The hub handed to [`SentryWriter::with_hub`](crate::writer::SentryWriter::with_hub)
    /// has no client bound, so nothing could ever be delivered.
    #[error("sentry hub has no client bound")]
    MissingClient,

    #[error("sentry flush did not complete within {0:?}")]
    FlushTimeout(Duration),

    #[error("invalid value {value:?} for environment variable {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}
