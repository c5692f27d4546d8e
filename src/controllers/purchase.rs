use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::engine::SeatOutcome;
use crate::middleware::ClientIdentity;
use crate::models::{SeatId, SeatState};
use crate::services::payment::PaymentOutcome;
use crate::AppState;

use super::status_419;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/purchase", post(purchase))
        .route("/purchase/cancel", patch(cancel_purchase))
}

#[derive(Debug, Deserialize)]
struct PurchaseRequest {
    seat_ids: Vec<SeatId>,
}

// POST /api/purchase
//
// Платёж идёт одним чеком на все удержанные места, но фиксация после
// Approved — по-местная: каждая строка ответа — независимый
// compare-and-set. Частичный успех не откатывается здесь; вернуть уже
// проданные места — компенсация уровня вызывающего.
async fn purchase(
    State(state): State<Arc<AppState>>,
    ClientIdentity(client): ClientIdentity,
    Json(req): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.seat_ids.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "seat_ids не может быть пустым".to_string()));
    }

    // В чек попадают только места, которые прямо сейчас удержаны
    // вызывающим; остальные всё равно не пройдут commit.
    let held: Vec<SeatId> = req
        .seat_ids
        .iter()
        .copied()
        .filter(|seat_id| {
            matches!(
                state.engine.get_seat(*seat_id),
                Ok(s) if s.state == SeatState::Held && s.holder == Some(client)
            )
        })
        .collect();

    if held.is_empty() {
        return Err((status_419(), "Нет удержанных мест для покупки".to_string()));
    }

    let order_id = Uuid::new_v4().to_string();
    let amount = held.len() as i64 * state.config.venue.seat_price;
    let outcome = state.payment.attempt_payment(&order_id, amount).await;

    match outcome {
        PaymentOutcome::Approved => {
            let results = state.engine.commit_purchase(&held, client);
            info!(%order_id, seats = held.len(), "purchase approved and committed");
            Ok((
                StatusCode::OK,
                Json(json!({
                    "order_id": order_id,
                    "payment": outcome,
                    "seats": outcome_rows(&results),
                })),
            ))
        }
        PaymentOutcome::Declined => {
            // Платёж не прошёл — возвращаем удержания, тоже по-местно.
            let results = state.engine.cancel_hold(&held, client);
            info!(%order_id, seats = held.len(), "payment declined, holds released");
            Ok((
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({
                    "order_id": order_id,
                    "payment": outcome,
                    "seats": outcome_rows(&results),
                })),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CancelPurchaseRequest {
    seat_ids: Vec<SeatId>,
}

// PATCH /api/purchase/cancel
async fn cancel_purchase(
    State(state): State<Arc<AppState>>,
    ClientIdentity(client): ClientIdentity,
    Json(req): Json<CancelPurchaseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.seat_ids.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "seat_ids не может быть пустым".to_string()));
    }

    let results = state.engine.cancel_hold(&req.seat_ids, client);
    Ok((StatusCode::OK, Json(json!({ "seats": outcome_rows(&results) }))))
}

fn outcome_rows(results: &[SeatOutcome]) -> Vec<serde_json::Value> {
    results
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(seat) => json!({
                "seat_id": outcome.seat_id,
                "status": seat.state,
                "version": seat.version,
            }),
            Err(e) => json!({
                "seat_id": outcome.seat_id,
                "error": e.to_string(),
            }),
        })
        .collect()
}
