use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use orderwatch_core::Error as CoreError;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicsResponse {
    /// Topic the mirror is consuming.
    topic: String,
    topics: Vec<String>,
}

async fn list_topics(State(state): State<Arc<AppState>>) -> ApiResult<Json<TopicsResponse>> {
    let topics = state
        .connector
        .list_topics()
        .await
        .map_err(CoreError::from)?;
    Ok(Json(TopicsResponse {
        topic: state.connector.topic().to_string(),
        topics,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/stream/topics", get(list_topics))
}
