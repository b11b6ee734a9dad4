//! Server-Sent Events (SSE) utilities
//!
//! Shared pieces of the roster push channel: the connect greeting, keep-alive
//! policy, and conversion of roster events to SSE frames.

use axum::response::sse::{Event, KeepAlive};
use std::time::Duration;
use tracing::warn;

use crate::events::{RosterEvent, CONNECTION_STATUS};

/// Interval between keep-alive comments on idle streams
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Keep-alive policy used by every roster stream
pub fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(KEEP_ALIVE_INTERVAL)
        .text("heartbeat")
}

/// First event on a new stream
pub fn connected_event() -> Event {
    Event::default().event(CONNECTION_STATUS).data("connected")
}

/// Convert a roster event into an SSE frame
///
/// The SSE `id` is the snapshot sequence so clients can tell snapshots apart.
/// Returns `None` (and logs) if the payload cannot be serialized.
pub fn to_sse_event(event: &RosterEvent) -> Option<Event> {
    match event.payload_json() {
        Ok(json) => Some(
            Event::default()
                .event(event.event_type())
                .id(event.sequence().to_string())
                .data(json),
        ),
        Err(e) => {
            warn!("Failed to serialize {} event: {}", event.event_type(), e);
            None
        }
    }
}
