use crate::AppState;
use crate::services::events::SiteEvent;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Server-sent stream of public site events.
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "text/event-stream of site events", content_type = "text/event-stream")
    ),
    tag = "events"
)]
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.events.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) if event.is_public() => {
                    if let Some(sse) = to_sse(&event) {
                        yield Ok(sse);
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("⚠️  Event stream lagged, skipped {} event(s)", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse(event: &SiteEvent) -> Option<Event> {
    Event::default().event(event.name()).json_data(event).ok()
}
