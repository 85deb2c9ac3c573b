// Server-sent event stream announcing each completed refresh cycle
use crate::application::refresh_controller::RenderedDashboard;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::watch;

pub const REFRESH_EVENT: &str = "refresh";

/// Yield the number of every cycle completed after subscribing.
///
/// Phase changes within a cycle are skipped; a slow reader only sees the
/// latest cycle.
pub fn cycle_stream(mut rx: watch::Receiver<RenderedDashboard>) -> impl Stream<Item = u64> {
    let mut last_seen = rx.borrow_and_update().cycle;
    async_stream::stream! {
        while rx.changed().await.is_ok() {
            let cycle = rx.borrow_and_update().cycle;
            if cycle != last_seen {
                last_seen = cycle;
                yield cycle;
            }
        }
    }
}

/// Wrap the cycle stream as an SSE response body.
pub fn refresh_events(
    rx: watch::Receiver<RenderedDashboard>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        for await cycle in cycle_stream(rx) {
            yield Ok(Event::default().event(REFRESH_EVENT).data(cycle.to_string()));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
