use crate::error::WriterError;
use crate::level::Level;
use chrono::{DateTime, Utc};
use regex::Regex;
use sentry::protocol::Event;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Source of event timestamps.
///
/// Events are stamped when they are written, never with the time found in
/// the record itself. Tests swap in a fixed clock.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl Clock {
    pub fn system() -> Self {
        Clock(Arc::new(Utc::now))
    }

    pub fn fixed(ts: DateTime<Utc>) -> Self {
        Clock(Arc::new(move || ts))
    }

    pub fn from_fn(now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Clock(Arc::new(now))
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Clock")
    }
}

/// Names of the reserved fields of a JSON record. Matching is exact and
/// case-sensitive; a record using other names has those fields land in
/// the event extras instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub level: String,
    pub timestamp: String,
    pub message: String,
    pub error: String,
}

impl Default for FieldNames {
    /// zerolog naming: `level`, `time`, `message`, `error`.
    fn default() -> Self {
        FieldNames {
            level: "level".to_string(),
            timestamp: "time".to_string(),
            message: "message".to_string(),
            error: "error".to_string(),
        }
    }
}

impl FieldNames {
    /// Naming used by `tracing-subscriber`'s JSON formatter with flattened
    /// event fields.
    pub fn tracing() -> Self {
        FieldNames {
            timestamp: "timestamp".to_string(),
            ..FieldNames::default()
        }
    }

    pub(crate) fn is_reserved(&self, key: &str) -> bool {
        key == self.level || key == self.timestamp || key == self.message || key == self.error
    }
}

/// Configuration of the writer itself. Immutable once the writer is built.
///
/// **Fields**
/// - `levels`: levels sent to Sentry as events. Defaults to error, fatal
///   and panic.
/// - `breadcrumbs`: when `true`, records of any other reportable level are
///   kept as breadcrumbs.
/// - `flush_timeout`: upper bound for the synchronous flush done after a
///   fatal event and on [`close`](crate::writer::SentryWriter::close).
/// - `field_names`: reserved field names of the incoming records.
/// - `clock`: timestamp source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub levels: BTreeSet<Level>,
    pub breadcrumbs: bool,
    #[serde(rename = "flush_timeout_ms", deserialize_with = "duration_from_millis")]
    pub flush_timeout: Duration,
    pub field_names: FieldNames,
    #[serde(skip)]
    pub clock: Clock,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            levels: [Level::Error, Level::Fatal, Level::Panic].into_iter().collect(),
            breadcrumbs: false,
            flush_timeout: Duration::from_secs(3),
            field_names: FieldNames::default(),
            clock: Clock::system(),
        }
    }
}

impl WriterConfig {
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = Level>) -> Self {
        self.levels = levels.into_iter().collect();
        self
    }

    pub fn with_breadcrumbs(mut self) -> Self {
        self.breadcrumbs = true;
        self
    }

    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    pub fn with_field_names(mut self, names: FieldNames) -> Self {
        self.field_names = names;
        self
    }

    /// Stamps every event with `ts`. For tests only.
    pub fn with_fixed_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.clock = Clock::fixed(ts);
        self
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

/// Hook run by the Sentry client on every event before it is sent.
pub type BeforeSend = Arc<dyn Fn(Event<'static>) -> Option<Event<'static>> + Send + Sync>;

/// Options handed to the Sentry client when the writer creates its own.
///
/// These are not interpreted by the writer; they end up in
/// [`sentry::ClientOptions`].
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SinkOptions {
    pub dsn: Option<String>,
    pub sample_rate: f32,
    pub release: Option<String>,
    pub environment: Option<String>,
    pub server_name: Option<String>,
    /// Regular expressions matched against the event message and exception
    /// values; a match drops the event.
    pub ignore_errors: Vec<String>,
    pub debug: bool,
    pub attach_stacktrace: bool,
    pub traces_sample_rate: f32,
    pub max_breadcrumbs: usize,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub accept_invalid_certs: bool,
    #[serde(skip)]
    pub before_send: Option<BeforeSend>,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            dsn: None,
            sample_rate: 1.0,
            release: None,
            environment: None,
            server_name: None,
            ignore_errors: Vec::new(),
            debug: false,
            attach_stacktrace: false,
            traces_sample_rate: 0.0,
            max_breadcrumbs: 100,
            http_proxy: None,
            https_proxy: None,
            accept_invalid_certs: false,
            before_send: None,
        }
    }
}

impl fmt::Debug for SinkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkOptions")
            .field("dsn", &self.dsn)
            .field("sample_rate", &self.sample_rate)
            .field("release", &self.release)
            .field("environment", &self.environment)
            .field("server_name", &self.server_name)
            .field("ignore_errors", &self.ignore_errors)
            .field("debug", &self.debug)
            .field("attach_stacktrace", &self.attach_stacktrace)
            .field("traces_sample_rate", &self.traces_sample_rate)
            .field("max_breadcrumbs", &self.max_breadcrumbs)
            .field("http_proxy", &self.http_proxy)
            .field("https_proxy", &self.https_proxy)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("before_send", &self.before_send.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl SinkOptions {
    pub fn with_dsn(dsn: impl Into<String>) -> Self {
        SinkOptions {
            dsn: Some(dsn.into()),
            ..SinkOptions::default()
        }
    }

    /// Builds the Sentry client options.
    ///
    /// **Returns**
    /// - `Err(WriterError::InvalidDsn)` when a non-empty DSN does not parse.
    /// - `Err(WriterError::InvalidIgnorePattern)` when an ignore pattern is
    ///   not a valid regular expression.
    pub fn into_client_options(self) -> Result<sentry::ClientOptions, WriterError> {
        let dsn = match self.dsn.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<sentry::types::Dsn>()?),
        };

        let ignore = self
            .ignore_errors
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| WriterError::InvalidIgnorePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sentry::ClientOptions {
            dsn,
            sample_rate: self.sample_rate,
            release: self.release.map(Cow::Owned),
            environment: self.environment.map(Cow::Owned),
            server_name: self.server_name.map(Cow::Owned),
            debug: self.debug,
            attach_stacktrace: self.attach_stacktrace,
            traces_sample_rate: self.traces_sample_rate,
            max_breadcrumbs: self.max_breadcrumbs,
            http_proxy: self.http_proxy.map(Cow::Owned),
            https_proxy: self.https_proxy.map(Cow::Owned),
            accept_invalid_certs: self.accept_invalid_certs,
            before_send: compose_before_send(ignore, self.before_send),
            ..Default::default()
        })
    }
}

/// The Sentry client has no ignore list of its own, so matching events are
/// filtered out ahead of the user hook.
fn compose_before_send(ignore: Vec<Regex>, hook: Option<BeforeSend>) -> Option<BeforeSend> {
    if ignore.is_empty() {
        return hook;
    }

    Some(Arc::new(move |event: Event<'static>| {
        if is_ignored(&event, &ignore) {
            return None;
        }
        match &hook {
            Some(hook) => hook(event),
            None => Some(event),
        }
    }))
}

fn is_ignored(event: &Event<'_>, patterns: &[Regex]) -> bool {
    let exceptions = event.exception.values.iter().flat_map(|exception| {
        let ty = Some(exception.ty.as_str()).filter(|ty| !ty.is_empty());
        ty.into_iter().chain(exception.value.as_deref())
    });

    event
        .message
        .as_deref()
        .into_iter()
        .chain(exceptions)
        .any(|text| patterns.iter().any(|re| re.is_match(text)))
}
