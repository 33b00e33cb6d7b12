use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};

use super::ApiError;
use crate::extractors::AppPath;
use crate::metrics::SSE_CONNECTIONS_ACTIVE;
use crate::models::GatingEvent;
use crate::services::AppState;

/// Keeps the connection gauge honest however the stream ends.
struct ConnectionGuard {
    client_id: String,
}

impl ConnectionGuard {
    fn new(client_id: String) -> Self {
        SSE_CONNECTIONS_ACTIVE.inc();
        Self { client_id }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        SSE_CONNECTIONS_ACTIVE.dec();
        tracing::info!(client_id = %self.client_id, "SSE stream closed");
    }
}

/// SSE endpoint for gate events
/// GET /api/v1/quiz/{client_id}/stream
pub async fn quiz_stream(
    State(state): State<Arc<AppState>>,
    AppPath(client_id): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let receiver = state.quiz.subscribe(&client_id).await?;
    tracing::info!(client_id = %client_id, "Client connected to SSE stream");

    let stream = gate_event_stream(receiver, ConnectionGuard::new(client_id));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn gate_event_stream(
    receiver: Receiver<GatingEvent>,
    guard: ConnectionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((receiver, guard), |(mut receiver, guard)| async move {
        loop {
            match receiver.recv().await {
                Ok(gate_event) => {
                    let event = Event::default()
                        .event(gate_event.event_name())
                        .data(gate_event.to_sse_data());
                    return Some((Ok(event), (receiver, guard)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        client_id = %guard.client_id,
                        skipped,
                        "SSE subscriber lagged, events dropped"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
