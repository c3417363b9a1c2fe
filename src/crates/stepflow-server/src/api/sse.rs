//! Server-sent event framing for snapshot streams
//!
//! The snapshot stream is consumed directly by the response body: when the
//! client disconnects axum drops the stream, which stops the run after the
//! step in flight.

use crate::api::error::{ApiError, ApiErrorResponse};
use axum::response::sse::Event;
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use stepflow_core::SnapshotStream;

/// `event: thread` first when the run has a thread, then `event: step` per
/// snapshot
///
/// A fatal error becomes a single `event: error` frame carrying the API
/// error body.
pub fn step_events(
    thread_id: Option<String>,
    snapshots: SnapshotStream,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send {
    let head = stream::iter(thread_id.map(|thread_id| {
        Event::default()
            .event("thread")
            .json_data(json!({"thread_id": thread_id}))
    }));

    let steps = snapshots.map(|item| match item {
        Ok(snapshot) => Event::default().event("step").json_data(&snapshot),
        Err(err) => error_event(err),
    });

    head.chain(steps)
}

/// Data-only frames of the form `{"<node>": <state>}`
///
/// Matches the update shape clients of the publishing endpoint consume.
pub fn node_update_events(
    snapshots: SnapshotStream,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send {
    snapshots.map(|item| match item {
        Ok(snapshot) => {
            let mut update = serde_json::Map::new();
            update.insert(snapshot.node, snapshot.state);
            Event::default().json_data(update)
        }
        Err(err) => error_event(err),
    })
}

fn error_event(err: stepflow_core::GraphError) -> Result<Event, axum::Error> {
    let err = ApiError::from(err);
    tracing::error!(code = err.code(), "Streamed run failed: {err}");
    Event::default()
        .event("error")
        .json_data(ApiErrorResponse::from(&err))
}
