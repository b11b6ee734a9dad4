//! Server-Sent Events (SSE) push channel
//!
//! A subscriber receives `ConnectionStatus` on connect, then a
//! `students_updated` / `counts_updated` pair for every snapshot broadcast
//! after it subscribed. There is no backlog; clients pull the roster with
//! `GET /api/students` when they connect.

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use roster_common::sse::{connected_event, keep_alive, to_sse_event};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// GET /api/events
///
/// The stream ends when the coordinator shuts down.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.coordinator.subscribe();
    let shutdown = state.coordinator.shutdown_token();
    info!(
        "SSE subscriber connected ({} total)",
        state.coordinator.subscriber_count()
    );

    let stream = async_stream::stream! {
        yield Ok(connected_event());

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("SSE: closing stream for shutdown");
                    break;
                }

                result = rx.recv() => match result {
                    Ok(snapshot) => {
                        for event in snapshot.events() {
                            if let Some(frame) = to_sse_event(&event) {
                                yield Ok(frame);
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Next snapshot replaces the whole roster, so nothing to recover
                        warn!("SSE subscriber lagged, skipped {} snapshots", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        debug!("SSE: stream ended");
    };

    Sse::new(stream).keep_alive(keep_alive())
}
