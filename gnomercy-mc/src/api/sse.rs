//! Server-Sent Events for continuous catalog reads
//!
//! Each stream delivers the current query result as soon as the client
//! connects, then a fresh result every time the underlying data changes.
//! Client disconnect drops the stream, which cancels the watch task and
//! releases its event bus subscription.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::parse_module_id;
use crate::catalog::filter::ListingFilter;
use crate::catalog::watch::CatalogWatch;
use crate::error::ApiError;
use crate::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// GET /api/modules/events - SSE stream of the filtered listing
pub async fn listing_events(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(?filter, "New SSE client watching the listing");
    let watch = state.watcher().watch_listing(filter);
    watch_stream("listing", watch)
}

/// GET /api/modules/:id/events - SSE stream of one module
///
/// A missing module streams `null`, and keeps streaming `null` until it
/// exists.
pub async fn module_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let module_id = parse_module_id(&id)?;
    info!(module_id = %module_id, "New SSE client watching a module");
    let watch = state.watcher().watch_module(module_id);
    Ok(watch_stream("module", watch))
}

/// GET /api/modules/:id/reviews/events - SSE stream of a module's reviews
pub async fn review_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let module_id = parse_module_id(&id)?;
    info!(module_id = %module_id, "New SSE client watching reviews");
    let watch = state.watcher().watch_reviews(module_id);
    Ok(watch_stream("reviews", watch))
}

fn watch_stream<T>(
    event_name: &'static str,
    mut watch: CatalogWatch<T>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + Send + 'static,
{
    let stream = async_stream::stream! {
        loop {
            tokio::select! {
                // Heartbeat every 15 seconds
                _ = tokio::time::sleep(HEARTBEAT_INTERVAL) => {
                    debug!("SSE: Sending heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }

                delivery = watch.next() => {
                    match delivery {
                        Some(value) => match serde_json::to_string(&value) {
                            Ok(json) => {
                                debug!("SSE: Delivering {} update", event_name);
                                yield Ok(Event::default().event(event_name).data(json));
                            }
                            Err(e) => {
                                warn!("SSE: Failed to serialize {} update: {}", event_name, e);
                            }
                        },
                        None => {
                            debug!("SSE: Watch ended, closing {} stream", event_name);
                            break;
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
