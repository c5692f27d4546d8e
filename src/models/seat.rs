use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SeatId = i64;

/// Непрозрачный идентификатор клиента (из заголовка X-Client-Id).
pub type ClientId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Free,
    Held,
    Sold,
}

impl SeatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatState::Free => "FREE",
            SeatState::Held => "HELD",
            SeatState::Sold => "SOLD",
        }
    }
}

/// Снимок одного места на момент чтения. Владеет копией данных,
/// никогда не ссылается на внутреннюю запись стора.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatSnapshot {
    pub id: SeatId,
    pub zone: String,
    pub category: String,
    pub state: SeatState,
    pub version: u64,
    pub holder: Option<ClientId>,
}
