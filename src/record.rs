use crate::config::{Clock, FieldNames};
use crate::level::Level;
use crate::stacktrace::capture_stacktrace;
use chrono::{DateTime, Utc};
use sentry::protocol::{Breadcrumb, Event, Exception};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Value of [`LogEvent::logger`] for every event produced by this crate.
pub const LOGGER_NAME: &str = "tracing";

/// A log record normalized into the shape of a Sentry event.
///
/// Reserved fields are routed to their own attributes; `extra` only holds
/// the remaining string-like fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub logger: &'static str,
    pub message: Option<String>,
    pub level: sentry::Level,
    pub exceptions: Vec<Exception>,
    pub extra: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(timestamp: DateTime<Utc>) -> Self {
        LogEvent {
            timestamp,
            logger: LOGGER_NAME,
            message: None,
            level: sentry::Level::Debug,
            exceptions: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    fn extra_map(&self) -> BTreeMap<String, Value> {
        self.extra
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }

    pub fn into_sentry_event(self) -> Event<'static> {
        Event {
            timestamp: SystemTime::from(self.timestamp),
            logger: Some(self.logger.to_string()),
            level: self.level,
            extra: self.extra_map(),
            message: self.message,
            exception: self.exceptions.into(),
            ..Default::default()
        }
    }

    /// The optional `category` breadcrumb attribute comes from the extra
    /// field of the same name.
    pub fn into_breadcrumb(self) -> Breadcrumb {
        Breadcrumb {
            timestamp: SystemTime::from(self.timestamp),
            category: self.extra.get("category").cloned(),
            level: self.level,
            data: self.extra_map(),
            message: self.message,
            ..Default::default()
        }
    }
}

/// Decodes one JSON record. Anything but an object is rejected.
pub fn decode_record(data: &[u8]) -> Option<Map<String, Value>> {
    serde_json::from_slice(data).ok()
}

/// Reads a value as a string. Scalars are rendered as text (`null` as the
/// empty string); objects and arrays cannot be read.
pub fn coerce_str(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads the level field of a raw record.
///
/// Never fails: a record that is not an object, lacks the field or carries
/// an unknown level yields [`Level::Disabled`].
pub fn parse_level(data: &[u8], names: &FieldNames) -> Level {
    decode_record(data)
        .map(|fields| level_from_fields(&fields, names))
        .unwrap_or(Level::Disabled)
}

pub fn level_from_fields(fields: &Map<String, Value>, names: &FieldNames) -> Level {
    fields
        .get(&names.level)
        .cloned()
        .and_then(coerce_str)
        .and_then(|name| name.parse().ok())
        .unwrap_or(Level::Disabled)
}

/// Parses everything but the level of a raw record.
///
/// **Returns**
/// - `None` if the record is not a JSON object or if the message or error
///   field cannot be read as a string.
/// - `Some(event)` otherwise, with `level` left at `Debug` for the caller to
///   set.
pub fn parse_event(data: &[u8], names: &FieldNames, clock: &Clock) -> Option<LogEvent> {
    event_from_fields(decode_record(data)?, names, clock)
}

pub fn event_from_fields(
    fields: Map<String, Value>,
    names: &FieldNames,
    clock: &Clock,
) -> Option<LogEvent> {
    let mut event = LogEvent::new(clock.now());

    for (key, value) in fields {
        if key == names.message {
            event.message = Some(coerce_str(value)?);
        } else if key == names.error {
            let value = coerce_str(value)?;
            event.exceptions.push(Exception {
                value: Some(value),
                stacktrace: capture_stacktrace(),
                ..Default::default()
            });
        } else if names.is_reserved(&key) {
            // level and timestamp
            continue;
        } else if let Some(value) = coerce_str(value) {
            event.extra.insert(key, value);
        }
    }

    Some(event)
}
