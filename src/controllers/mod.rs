pub mod availability;
pub mod purchase;
pub mod seats;
pub mod stream;

use axum::http::StatusCode;
use axum::Router;
use std::sync::Arc;

use crate::error::EngineError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(seats::routes())
        .merge(availability::routes())
        .merge(purchase::routes())
        .merge(stream::routes())
}

/* ---------- helpers ---------- */

pub(crate) fn status_419() -> StatusCode {
    StatusCode::from_u16(419).unwrap_or(StatusCode::CONFLICT)
}

pub(crate) fn engine_error_response(e: &EngineError) -> (StatusCode, String) {
    match e {
        EngineError::NotFound => (StatusCode::NOT_FOUND, "Место или категория не найдены".to_string()),
        EngineError::Conflict | EngineError::VersionConflict => {
            (status_419(), "Место уже занято другим клиентом".to_string())
        }
        EngineError::Forbidden => {
            (StatusCode::FORBIDDEN, "Место не принадлежит вам".to_string())
        }
        EngineError::InvalidTransition => {
            (StatusCode::CONFLICT, "Недопустимый переход состояния места".to_string())
        }
        EngineError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
    }
}
