//! Таблица легальных переходов места.
//!
//! Free -> Held   (select, место свободно)
//! Held -> Free   (deselect или неудачный платёж, только держатель)
//! Held -> Sold   (успешный платёж, только держатель)
//! Sold -> Sold   (повторный commit — no-op, версия не растёт)
//!
//! Всё остальное отклоняется и не трогает запись.

use crate::error::EngineError;
use crate::models::{ClientId, SeatState};

/// Намерение клиента. `Release` покрывает и явный deselect, и
/// возврат места после отклонённого платежа — guard у них общий.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Select,
    Release,
    Commit,
}

/// Результат проверки: либо новая пара (state, holder), либо
/// идемпотентный no-op без записи в стор.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Apply {
        state: SeatState,
        holder: Option<ClientId>,
    },
    Noop,
}

pub fn next(
    current: SeatState,
    holder: Option<ClientId>,
    intent: Intent,
    client: ClientId,
) -> Result<Next, EngineError> {
    match (current, intent) {
        (SeatState::Free, Intent::Select) => Ok(Next::Apply {
            state: SeatState::Held,
            holder: Some(client),
        }),
        // Место уже занято (кем угодно, включая самого клиента) или
        // продано — для select это проигранная гонка, не ошибка протокола.
        (SeatState::Held, Intent::Select) | (SeatState::Sold, Intent::Select) => {
            Err(EngineError::Conflict)
        }

        (SeatState::Held, Intent::Release) => {
            if holder == Some(client) {
                Ok(Next::Apply { state: SeatState::Free, holder: None })
            } else {
                Err(EngineError::Forbidden)
            }
        }

        (SeatState::Held, Intent::Commit) => {
            if holder == Some(client) {
                // holder хранится только пока место Held
                Ok(Next::Apply { state: SeatState::Sold, holder: None })
            } else {
                Err(EngineError::Forbidden)
            }
        }
        // Идемпотентный повторный commit: успех без инкремента версии.
        (SeatState::Sold, Intent::Commit) => Ok(Next::Noop),

        (SeatState::Free, Intent::Release)
        | (SeatState::Free, Intent::Commit)
        | (SeatState::Sold, Intent::Release) => Err(EngineError::InvalidTransition),
    }
}
