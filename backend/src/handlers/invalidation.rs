//! Server-sent stream of stale collection names

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::AppState;

/// Each event carries one collection name, e.g. `finished_goods`
pub async fn invalidation_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.invalidations.subscribe()).filter_map(|msg| match msg {
        Ok(collection) => Some(Ok::<_, Infallible>(
            Event::default()
                .event("invalidate")
                .data(collection.as_str()),
        )),
        Err(e) => {
            // Lagged receivers skip missed names; clients refetch on the next one
            tracing::warn!(error = %e, "invalidation subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
