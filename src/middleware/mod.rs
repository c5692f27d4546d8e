use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use uuid::Uuid;

/// Непрозрачная идентичность клиента из заголовка X-Client-Id.
/// Аутентификация вне зоны ответственности движка: идентификатор
/// нужен только как владелец удержания.
#[derive(Debug, Clone, Copy)]
pub struct ClientIdentity(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for ClientIdentity {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Получаем заголовок X-Client-Id
        let raw = parts
            .headers
            .get("x-client-id")
            .and_then(|value| value.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Заголовок X-Client-Id обязателен".to_string(),
            ))?;

        let client_id = Uuid::parse_str(raw).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                "X-Client-Id должен быть корректным UUID".to_string(),
            )
        })?;

        Ok(ClientIdentity(client_id))
    }
}
