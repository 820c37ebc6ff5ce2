//! Environment variable names used by this crate for convenient
//! configuration of the writer from services.
//!
//! These are purely helpers; the core writer types remain decoupled from
//! environment access.

use crate::config::{SinkOptions, WriterConfig};
use crate::error::WriterError;
use crate::level::Level;
use std::str::FromStr;
use std::time::Duration;

/// Sentry DSN. Empty or unset disables delivery.
pub const SENTRY_DSN_ENV: &str = "SENTRY_DSN";

/// Release reported with events.
pub const SENTRY_RELEASE_ENV: &str = "SENTRY_RELEASE";

/// Environment reported with events.
pub const SENTRY_ENVIRONMENT_ENV: &str = "SENTRY_ENVIRONMENT";

/// Server name reported with events.
pub const SENTRY_SERVER_NAME_ENV: &str = "SENTRY_SERVER_NAME";

/// Event sample rate between 0.0 and 1.0.
pub const SENTRY_SAMPLE_RATE_ENV: &str = "SENTRY_SAMPLE_RATE";

/// Comma-separated list of levels sent as events, e.g. `error,fatal,panic`.
pub const SENTRY_WRITER_LEVELS_ENV: &str = "SENTRY_WRITER_LEVELS";

/// `true` to keep other levels as breadcrumbs.
pub const SENTRY_WRITER_BREADCRUMBS_ENV: &str = "SENTRY_WRITER_BREADCRUMBS";

/// Flush timeout in milliseconds.
pub const SENTRY_WRITER_FLUSH_TIMEOUT_MS_ENV: &str = "SENTRY_WRITER_FLUSH_TIMEOUT_MS";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank variables both read as `None`.
fn env_opt(key: &str) -> Option<String> {
    let value = env_or(key, "");
    (!value.trim().is_empty()).then_some(value)
}

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>, WriterError> {
    env_opt(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| WriterError::InvalidEnv { key, value })
        })
        .transpose()
}

/// [`WriterConfig::default`] overridden by the `SENTRY_WRITER_*` variables.
pub fn writer_config_from_env() -> Result<WriterConfig, WriterError> {
    let mut config = WriterConfig::default();

    if let Some(raw) = env_opt(SENTRY_WRITER_LEVELS_ENV) {
        config.levels = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Level::from_str)
            .collect::<Result<_, _>>()
            .map_err(|_| WriterError::InvalidEnv {
                key: SENTRY_WRITER_LEVELS_ENV,
                value: raw.clone(),
            })?;
    }
    if let Some(breadcrumbs) = env_parse(SENTRY_WRITER_BREADCRUMBS_ENV)? {
        config.breadcrumbs = breadcrumbs;
    }
    if let Some(millis) = env_parse(SENTRY_WRITER_FLUSH_TIMEOUT_MS_ENV)? {
        config.flush_timeout = Duration::from_millis(millis);
    }

    Ok(config)
}

/// [`SinkOptions::default`] overridden by the `SENTRY_*` variables.
pub fn sink_options_from_env() -> Result<SinkOptions, WriterError> {
    let mut options = SinkOptions {
        dsn: env_opt(SENTRY_DSN_ENV),
        release: env_opt(SENTRY_RELEASE_ENV),
        environment: env_opt(SENTRY_ENVIRONMENT_ENV),
        server_name: env_opt(SENTRY_SERVER_NAME_ENV),
        ..SinkOptions::default()
    };
    if let Some(rate) = env_parse(SENTRY_SAMPLE_RATE_ENV)? {
        options.sample_rate = rate;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL: &[&str] = &[
        SENTRY_DSN_ENV,
        SENTRY_RELEASE_ENV,
        SENTRY_ENVIRONMENT_ENV,
        SENTRY_SERVER_NAME_ENV,
        SENTRY_SAMPLE_RATE_ENV,
        SENTRY_WRITER_LEVELS_ENV,
        SENTRY_WRITER_BREADCRUMBS_ENV,
        SENTRY_WRITER_FLUSH_TIMEOUT_MS_ENV,
    ];

    fn clear() {
        for key in ALL {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn unset_environment_gives_defaults() {
        clear();
        let config = writer_config_from_env().unwrap();
        assert_eq!(
            config.levels,
            [Level::Error, Level::Fatal, Level::Panic].into_iter().collect()
        );
        assert!(!config.breadcrumbs);
        assert_eq!(config.flush_timeout, Duration::from_secs(3));

        let options = sink_options_from_env().unwrap();
        assert!(options.dsn.is_none());
        assert_eq!(options.sample_rate, 1.0);
    }

    #[test]
    #[serial]
    fn reads_writer_settings() {
        clear();
        std::env::set_var(SENTRY_WRITER_LEVELS_ENV, "warn, error");
        std::env::set_var(SENTRY_WRITER_BREADCRUMBS_ENV, "true");
        std::env::set_var(SENTRY_WRITER_FLUSH_TIMEOUT_MS_ENV, "500");

        let config = writer_config_from_env().unwrap();
        assert_eq!(config.levels, [Level::Warn, Level::Error].into_iter().collect());
        assert!(config.breadcrumbs);
        assert_eq!(config.flush_timeout, Duration::from_millis(500));
        clear();
    }

    #[test]
    #[serial]
    fn reads_sink_options() {
        clear();
        std::env::set_var(SENTRY_DSN_ENV, "https://public@sentry.invalid/1");
        std::env::set_var(SENTRY_ENVIRONMENT_ENV, "production");
        std::env::set_var(SENTRY_SAMPLE_RATE_ENV, "0.25");

        let options = sink_options_from_env().unwrap();
        assert_eq!(options.dsn.as_deref(), Some("https://public@sentry.invalid/1"));
        assert_eq!(options.environment.as_deref(), Some("production"));
        assert_eq!(options.sample_rate, 0.25);
        assert!(options.release.is_none());
        clear();
    }

    #[test]
    #[serial]
    fn invalid_values_name_the_variable() {
        clear();
        std::env::set_var(SENTRY_WRITER_LEVELS_ENV, "error,loud");
        let err = writer_config_from_env().unwrap_err();
        assert!(matches!(err, WriterError::InvalidEnv { key, .. } if key == SENTRY_WRITER_LEVELS_ENV));

        clear();
        std::env::set_var(SENTRY_WRITER_FLUSH_TIMEOUT_MS_ENV, "soon");
        let err = writer_config_from_env().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"soon\" for environment variable SENTRY_WRITER_FLUSH_TIMEOUT_MS"
        );
        clear();
    }

    #[test]
    #[serial]
    fn env_or_falls_back() {
        clear();
        assert_eq!(env_or(SENTRY_ENVIRONMENT_ENV, "development"), "development");
    }

    #[test]
    #[serial]
    fn blank_variables_count_as_unset() {
        clear();
        std::env::set_var(SENTRY_DSN_ENV, "  ");
        std::env::set_var(SENTRY_RELEASE_ENV, "");
        std::env::set_var(SENTRY_SAMPLE_RATE_ENV, " ");

        let options = sink_options_from_env().unwrap();
        assert!(options.dsn.is_none());
        assert!(options.release.is_none());
        assert_eq!(options.sample_rate, 1.0);
        clear();
    }
}
