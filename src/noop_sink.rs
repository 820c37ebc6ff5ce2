use crate::sink::EventSink;
use sentry::protocol::{Breadcrumb, Event};
use std::time::Duration;

/// A sink that simply drops all events and breadcrumbs.
///
/// Useful for measuring the overhead of the writer itself without any
/// network I/O, and for tests that only care about the write contract.
#[derive(Clone, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn capture_event(&self, _event: Event<'static>) {}

    fn add_breadcrumb(&self, _breadcrumb: Breadcrumb) {}

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}
