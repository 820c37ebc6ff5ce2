use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity levels understood in the `level` field of a JSON record.
///
/// The vocabulary is the zerolog one, which is a superset of the levels
/// `tracing` emits. `NoLevel` is what an empty level string parses to and
/// `Disabled` marks a record whose level could not be determined; neither
/// is ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
    NoLevel,
    Disabled,
}

/// Source level → Sentry severity. `Fatal` and `Panic` collapse onto the
/// same Sentry tier.
static LEVEL_MAPPING: [(Level, sentry::Level); 6] = [
    (Level::Debug, sentry::Level::Debug),
    (Level::Info, sentry::Level::Info),
    (Level::Warn, sentry::Level::Warning),
    (Level::Error, sentry::Level::Error),
    (Level::Fatal, sentry::Level::Fatal),
    (Level::Panic, sentry::Level::Fatal),
];

/// Strict lookup in the level table. `None` for levels that must never
/// reach Sentry (trace and the two sentinels).
pub fn mapped_level(level: Level) -> Option<sentry::Level> {
    LEVEL_MAPPING
        .iter()
        .find(|(source, _)| *source == level)
        .map(|(_, target)| *target)
}

/// Returns the corresponding Sentry level, or `Debug` if not matching.
pub fn sentry_level(level: Level) -> sentry::Level {
    mapped_level(level).unwrap_or(sentry::Level::Debug)
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
            Level::NoLevel => "",
            Level::Disabled => "disabled",
        }
    }

    fn from_number(value: i64) -> Option<Level> {
        match value {
            -1 => Some(Level::Trace),
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warn),
            3 => Some(Level::Error),
            4 => Some(Level::Fatal),
            5 => Some(Level::Panic),
            6 => Some(Level::NoLevel),
            7 => Some(Level::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not part of the vocabulary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown level string {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Level names are matched ignoring ASCII case, so both `"error"` and
    /// `tracing`'s `"ERROR"` parse. Numeric zerolog levels are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_ascii_lowercase().as_str() {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" | "warning" => Level::Warn,
            "error" => Level::Error,
            "fatal" => Level::Fatal,
            "panic" => Level::Panic,
            "disabled" => Level::Disabled,
            "" => Level::NoLevel,
            other => other
                .parse::<i64>()
                .ok()
                .and_then(Level::from_number)
                .ok_or_else(|| ParseLevelError(s.to_string()))?,
        };
        Ok(level)
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}
