#![allow(dead_code)]

use sentry::protocol::{Breadcrumb, Event};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_sentry_writer::sink::EventSink;

pub const LOG_EVENT_JSON: &[u8] = br#"{"level":"error","requestId":"bee07485-2485-4f64-99e1-d10165884ca7","error":"dial timeout","time":"2020-06-25T17:19:00+03:00","message":"test message"}"#;

/// Sink keeping everything it is given, for assertions.
pub struct RecordingSink {
    pub events: Mutex<Vec<Event<'static>>>,
    pub breadcrumbs: Mutex<Vec<Breadcrumb>>,
    pub flushes: Mutex<Vec<Duration>>,
    flush_ok: AtomicBool,
    captures: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingSink {
            events: Mutex::new(Vec::new()),
            breadcrumbs: Mutex::new(Vec::new()),
            flushes: Mutex::new(Vec::new()),
            flush_ok: AtomicBool::new(true),
            captures: AtomicUsize::new(0),
        })
    }

    pub fn timing_out() -> Arc<Self> {
        let sink = Self::new();
        sink.flush_ok.store(false, Ordering::SeqCst);
        sink
    }

    pub fn events(&self) -> Vec<Event<'static>> {
        self.events.lock().unwrap().clone()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.breadcrumbs.lock().unwrap().clone()
    }

    pub fn flushes(&self) -> Vec<Duration> {
        self.flushes.lock().unwrap().clone()
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

impl EventSink for RecordingSink {
    fn capture_event(&self, event: Event<'static>) {
        self.captures.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(event);
    }

    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        self.breadcrumbs.lock().unwrap().push(breadcrumb);
    }

    fn flush(&self, timeout: Duration) -> bool {
        self.flushes.lock().unwrap().push(timeout);
        self.flush_ok.load(Ordering::SeqCst)
    }
}
