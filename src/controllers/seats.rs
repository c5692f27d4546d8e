use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::middleware::ClientIdentity;
use crate::models::{SeatId, SeatSnapshot, SeatState};
use crate::AppState;

use super::engine_error_response;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(get_seats))
        .route("/seats/select", patch(select_seat))
        .route("/seats/release", patch(release_seat))
}

/* ---------- SEATS ---------- */

#[derive(Debug, Deserialize)]
struct SeatsQuery {
    category: Option<String>,
    zone: Option<String>,
    status: Option<String>, // FREE, HELD, SOLD
    page: Option<u32>,
    #[serde(rename = "pageSize")]
    page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SeatResponse {
    id: SeatId,
    zone: String,
    category: String,
    status: SeatState,
    version: u64,
}

// GET /api/seats
async fn get_seats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeatsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let status = match params.status.as_deref() {
        None => None,
        Some("FREE") => Some(SeatState::Free),
        Some("HELD") => Some(SeatState::Held),
        Some("SOLD") => Some(SeatState::Sold),
        Some(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "status должен быть FREE | HELD | SOLD".to_string(),
            ));
        }
    };

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 100) as usize;
    let offset = (page as usize - 1) * page_size;

    let payload: Vec<SeatResponse> = state
        .engine
        .list_seats()
        .into_iter()
        .filter(|s| params.category.as_deref().is_none_or(|c| s.category == c))
        .filter(|s| params.zone.as_deref().is_none_or(|z| s.zone == z))
        .filter(|s| status.is_none_or(|st| s.state == st))
        .skip(offset)
        .take(page_size)
        .map(seat_response)
        .collect();

    Ok((StatusCode::OK, Json(payload)))
}

fn seat_response(s: SeatSnapshot) -> SeatResponse {
    SeatResponse {
        id: s.id,
        zone: s.zone,
        category: s.category,
        status: s.state,
        version: s.version,
    }
}

// PATCH /api/seats/select
#[derive(Debug, Deserialize)]
struct SelectSeatRequest {
    seat_id: SeatId,
}

async fn select_seat(
    State(state): State<Arc<AppState>>,
    ClientIdentity(client): ClientIdentity,
    Json(req): Json<SelectSeatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.seat_id <= 0 {
        return Err((StatusCode::BAD_REQUEST, "seat_id должен быть > 0".to_string()));
    }

    match state.engine.select(req.seat_id, client) {
        Ok(seat) => Ok((
            StatusCode::OK,
            Json(json!({
                "message": "Место успешно удержано",
                "seat": seat_response(seat),
            })),
        )),
        Err(e) => Err(engine_error_response(&e)),
    }
}

// PATCH /api/seats/release
#[derive(Debug, Deserialize)]
struct ReleaseSeatRequest {
    seat_id: SeatId,
}

async fn release_seat(
    State(state): State<Arc<AppState>>,
    ClientIdentity(client): ClientIdentity,
    Json(req): Json<ReleaseSeatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.seat_id <= 0 {
        return Err((StatusCode::BAD_REQUEST, "seat_id должен быть > 0".to_string()));
    }

    match state.engine.deselect(req.seat_id, client) {
        Ok(seat) => Ok((
            StatusCode::OK,
            Json(json!({
                "message": "Место успешно освобождено",
                "seat": seat_response(seat),
            })),
        )),
        Err(e) => Err(engine_error_response(&e)),
    }
}
