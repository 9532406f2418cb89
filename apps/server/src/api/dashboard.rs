use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::{
    error::ApiResult,
    events::{ServerEvent, VIEW_UPDATED},
    main_lib::AppState,
};
use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt as _;
use futures_core::stream::Stream;
use orderwatch_core::job_orders::JobOrderStatus;
use orderwatch_core::mirror::ViewSnapshot;
use serde::Serialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

/// One bar of the completion chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    pub order_number: String,
    pub percent_completion: f64,
    pub status: JobOrderStatus,
    pub color: &'static str,
}

pub fn status_color(status: JobOrderStatus) -> &'static str {
    match status {
        JobOrderStatus::Ongoing => "blue",
        JobOrderStatus::Completed => "green",
    }
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    Json(state.view.read().as_ref().clone())
}

async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Json<ViewSnapshot>> {
    let snapshot = state.refresher.refresh().await?;
    Ok(Json(snapshot.as_ref().clone()))
}

async fn get_chart(State(state): State<Arc<AppState>>) -> Json<Vec<ChartBar>> {
    let bars = state
        .view
        .read()
        .orders
        .iter()
        .map(|order| ChartBar {
            order_number: order.order_number.clone(),
            percent_completion: order.percent_completion,
            status: order.status,
            color: status_color(order.status),
        })
        .collect();
    Json(bars)
}

fn to_sse(event: ServerEvent) -> Option<SseEvent> {
    let sse_event = SseEvent::default().event(event.name);
    match event.payload {
        Some(payload) => match sse_event.json_data(payload) {
            Ok(ev) => Some(ev),
            Err(err) => {
                tracing::error!(
                    "Failed to serialize SSE payload for {}: {}",
                    event.name,
                    err
                );
                None
            }
        },
        None => Some(sse_event.data("null")),
    }
}

/// Streams dashboard events, starting with the current view.
async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(state.event_bus.subscribe());
    let current = serde_json::to_value(state.view.read().as_ref())
        .ok()
        .map(|payload| ServerEvent::with_payload(VIEW_UPDATED, payload));

    let updates = tokio_stream::StreamExt::filter_map(receiver, |event| match event {
        Ok(evt) => Some(evt),
        Err(BroadcastStreamRecvError::Lagged(_)) => None,
    });
    let stream = futures::stream::iter(current)
        .chain(updates)
        .filter_map(|evt| async move { to_sse(evt).map(Ok) })
        .take_until(state.shutdown_token.clone().cancelled_owned());

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/refresh", post(refresh_dashboard))
        .route("/dashboard/chart", get(get_chart))
        .route("/events/stream", get(stream_events))
}
