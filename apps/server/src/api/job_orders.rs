use std::sync::Arc;

use crate::{
    error::{ApiJson, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use orderwatch_core::job_orders::{JobOrder, JobOrderStatus, JobOrderUpdate, NewJobOrder};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateJobOrderBody {
    order_number: String,
    desired_qty: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateJobOrderBody {
    current_qty: i32,
    status: JobOrderStatus,
}

/// Re-reads the store into the dashboard view after a write.
async fn refresh_view(state: &AppState) {
    if let Err(err) = state.refresher.refresh().await {
        tracing::warn!("View refresh after write failed: {}", err);
    }
}

async fn list_job_orders(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<JobOrder>>> {
    let orders = state.job_order_service.get_job_orders()?;
    Ok(Json(orders))
}

async fn get_job_order(
    Path(order_number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<JobOrder>> {
    let order = state.job_order_service.get_job_order(&order_number)?;
    Ok(Json(order))
}

async fn create_job_order(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateJobOrderBody>,
) -> ApiResult<(StatusCode, Json<JobOrder>)> {
    let created = state
        .job_order_service
        .create_job_order(NewJobOrder::new(body.order_number, body.desired_qty))
        .await?;
    refresh_view(&state).await;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_job_order(
    Path(order_number): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<UpdateJobOrderBody>,
) -> ApiResult<Json<JobOrder>> {
    let updated = state
        .job_order_service
        .update_job_order(
            order_number,
            JobOrderUpdate::new(body.current_qty, body.status),
        )
        .await?;
    refresh_view(&state).await;
    Ok(Json(updated))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/job-orders", get(list_job_orders).post(create_job_order))
        .route(
            "/job-orders/{order_number}",
            get(get_job_order).put(update_job_order),
        )
}
