mod common;

use common::LOG_EVENT_JSON;
use sentry::protocol::Event;
use sentry::test::TestTransport;
use sentry::{Hub, Scope};
use serde_json::Value;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_sentry_writer::config::BeforeSend;
use tracing_sentry_writer::{Level, SentryWriter, SinkOptions, WriterConfig, WriterError};

const TEST_DSN: &str = "https://public@sentry.invalid/1";

fn test_hub(options: SinkOptions) -> (Arc<Hub>, Arc<TestTransport>) {
    let transport = TestTransport::new();
    let mut client_options = SinkOptions {
        dsn: Some(TEST_DSN.to_string()),
        ..options
    }
    .into_client_options()
    .unwrap();
    client_options.transport = Some(Arc::new(transport.clone()));

    let client = Arc::new(sentry::Client::with_options(client_options));
    let hub = Arc::new(Hub::new(Some(client), Arc::new(Scope::default())));
    (hub, transport)
}

#[test]
fn captured_event_reaches_the_transport() {
    let (hub, transport) = test_hub(SinkOptions::default());
    let mut writer = SentryWriter::with_hub(hub, WriterConfig::default()).unwrap();

    writer.write_all(LOG_EVENT_JSON).unwrap();

    let events = transport.fetch_and_clear_events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, sentry::Level::Error);
    assert_eq!(event.message.as_deref(), Some("test message"));
    assert_eq!(event.exception.values.len(), 1);
    assert_eq!(event.exception.values[0].value.as_deref(), Some("dial timeout"));
    assert_eq!(
        event.extra["requestId"],
        Value::from("bee07485-2485-4f64-99e1-d10165884ca7")
    );
}

#[test]
fn before_send_hook_sees_the_event() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let hook: BeforeSend = Arc::new(move |event: Event<'static>| {
        seen.fetch_add(1, Ordering::SeqCst);
        assert_eq!(event.level, sentry::Level::Error);
        assert_eq!(event.message.as_deref(), Some("test message"));
        Some(event)
    });
    let (hub, transport) = test_hub(SinkOptions {
        before_send: Some(hook),
        ..SinkOptions::default()
    });
    let mut writer = SentryWriter::with_hub(hub, WriterConfig::default()).unwrap();

    writer.write_all(LOG_EVENT_JSON).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.fetch_and_clear_events().len(), 1);

    // trace records never get as far as the client
    writer
        .write_all(br#"{"level":"trace","message":"test message"}"#)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn ignore_patterns_drop_matching_events() {
    let (hub, transport) = test_hub(SinkOptions {
        ignore_errors: vec!["dial timeout".to_string()],
        ..SinkOptions::default()
    });
    let mut writer = SentryWriter::with_hub(hub, WriterConfig::default()).unwrap();

    writer.write_all(LOG_EVENT_JSON).unwrap();
    writer
        .write_all(br#"{"level":"error","message":"disk full"}"#)
        .unwrap();

    let events = transport.fetch_and_clear_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message.as_deref(), Some("disk full"));
}

#[test]
fn breadcrumbs_travel_with_the_next_event() {
    let (hub, transport) = test_hub(SinkOptions::default());
    let mut writer =
        SentryWriter::with_hub(hub, WriterConfig::default().with_breadcrumbs()).unwrap();

    writer
        .write_all(br#"{"level":"info","message":"connecting","category":"db"}"#)
        .unwrap();
    assert!(transport.fetch_and_clear_events().is_empty());

    writer.write_all(LOG_EVENT_JSON).unwrap();
    let events = transport.fetch_and_clear_events();
    assert_eq!(events.len(), 1);

    let breadcrumbs = &events[0].breadcrumbs.values;
    assert_eq!(breadcrumbs.len(), 1);
    assert_eq!(breadcrumbs[0].message.as_deref(), Some("connecting"));
    assert_eq!(breadcrumbs[0].category.as_deref(), Some("db"));
    assert_eq!(breadcrumbs[0].level, sentry::Level::Info);
}

#[test]
fn disabled_levels_without_breadcrumbs_send_nothing() {
    let (hub, transport) = test_hub(SinkOptions::default());
    let mut writer =
        SentryWriter::with_hub(hub, WriterConfig::default().with_levels([Level::Fatal])).unwrap();

    writer.write_all(LOG_EVENT_JSON).unwrap();
    writer
        .write_all(br#"{"level":"fatal","message":"shutting down"}"#)
        .unwrap();

    let events = transport.fetch_and_clear_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, sentry::Level::Fatal);
    assert!(events[0].breadcrumbs.values.is_empty());
}

#[test]
fn close_succeeds_once_flushed() {
    let (hub, _transport) = test_hub(SinkOptions::default());
    let writer = SentryWriter::with_hub(hub, WriterConfig::default()).unwrap();
    writer.close().unwrap();
}

#[test]
fn hub_without_client_is_rejected() {
    let hub = Arc::new(Hub::new(None, Arc::new(Scope::default())));
    let err = SentryWriter::with_hub(hub, WriterConfig::default()).unwrap_err();
    assert!(matches!(err, WriterError::MissingClient));
}

#[test]
fn invalid_dsn_fails_construction() {
    let err = SentryWriter::new(SinkOptions::with_dsn("sentry.invalid"), WriterConfig::default())
        .unwrap_err();
    assert!(matches!(err, WriterError::InvalidDsn(_)));
}

#[test]
fn writer_without_dsn_swallows_everything() {
    let mut writer = SentryWriter::new(SinkOptions::default(), WriterConfig::default()).unwrap();
    assert_eq!(writer.write(LOG_EVENT_JSON).unwrap(), LOG_EVENT_JSON.len());
    writer.close().unwrap();
}
