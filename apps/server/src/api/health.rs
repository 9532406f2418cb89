use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Router};

pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready once the snapshot store answers a read.
pub async fn readyz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.job_order_service.get_job_orders()?;
    Ok("ok")
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
