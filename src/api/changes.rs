use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::controller::AppState;

/// GET /changes
///
/// Server-sent events, one per committed mutation. The event name is the
/// table; the data is the JSON `ChangeEvent`.
pub async fn change_feed(
    State(st): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = st.repos.changes.subscribe();
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    let event = Event::default()
                        .event(change.table.as_ref())
                        .json_data(&change)
                        .unwrap_or_else(|_| Event::default().comment("unserializable change"));
                    return Some((Ok(event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change feed subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}
