use sentry::protocol::{Breadcrumb, Event};
use sentry::Hub;
use std::time::Duration;

/// Destination for the events and breadcrumbs produced by the writer.
///
/// Implementations own delivery, batching and retries. The writer calls
/// them synchronously from whatever thread is logging, so they have to be
/// safe for concurrent use.
pub trait EventSink: Send + Sync {
    /// Hand one event over for delivery.
    fn capture_event(&self, event: Event<'static>);

    /// Record a breadcrumb. Breadcrumbs are not delivered on their own;
    /// they travel with the next captured event.
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb);

    /// Block until pending deliveries are done or `timeout` elapses.
    ///
    /// **Returns**
    /// - `true` if everything was flushed.
    /// - `false` if the timeout was hit first.
    fn flush(&self, timeout: Duration) -> bool;
}

/// A Sentry hub is the regular sink. It must have a client bound; without
/// one captures and breadcrumbs are silently discarded.
impl EventSink for Hub {
    fn capture_event(&self, event: Event<'static>) {
        Hub::capture_event(self, event);
    }

    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        Hub::add_breadcrumb(self, breadcrumb);
    }

    fn flush(&self, timeout: Duration) -> bool {
        self.client()
            .map_or(true, |client| client.flush(Some(timeout)))
    }
}
