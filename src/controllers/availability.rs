use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;

use super::engine_error_response;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/availability", get(check_availability))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    category: String,
    quantity: i64,
}

// GET /api/availability?category=General&quantity=3
//
// Пустой список — валидный ответ "нечего порекомендовать", не ошибка.
async fn check_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match state.engine.recommend(&params.category, params.quantity) {
        Ok(zones) => Ok((StatusCode::OK, Json(zones))),
        Err(e) => Err(engine_error_response(&e)),
    }
}
